fn main() {
    cookieheap::cli::run();
}
