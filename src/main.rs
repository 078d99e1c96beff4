fn main() {
    if let Err(e) = cets_model::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
