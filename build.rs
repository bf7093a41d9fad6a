fn main() {
    // Propagate ESP-IDF cfg flags only when building the on-device firmware;
    // host builds (tests, simulation) skip the sysenv plumbing entirely.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
