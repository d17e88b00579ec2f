fn main() {
    if let Err(err) = famtree_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
