//! Address book inspector binary.

fn main() -> eyre::Result<()> {
    addrbook_cli::run()
}
