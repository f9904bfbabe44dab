fn main() -> anyhow::Result<()> {
  groovebox_lib::run()
}
