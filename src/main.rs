fn main() {
    #[cfg(feature = "cli")]
    unswf::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("unswf: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
