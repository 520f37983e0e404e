fn main() {
    spotview::cli::run();
}
