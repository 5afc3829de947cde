fn main() {
    if let Err(err) = hieragram::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
