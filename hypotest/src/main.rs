fn main() -> anyhow::Result<()> {
    hypotest::run()
}
