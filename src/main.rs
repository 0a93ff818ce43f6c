fn main() {
    if let Err(err) = estate_analytics::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
