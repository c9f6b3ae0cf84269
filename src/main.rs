fn main() -> anyhow::Result<()> {
    steadyhint_lib::run()
}
