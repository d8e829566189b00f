fn main() {
    if let Err(error) = canvasview::run() {
        eprintln!("canvasview failed to start: {error}");
        std::process::exit(1);
    }
}
