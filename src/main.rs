fn main() {
    #[cfg(feature = "cli")]
    halpack::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("halpack: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
