fn main() -> Result<(), Box<dyn std::error::Error>> {
    lyra::runtime::run()
}
