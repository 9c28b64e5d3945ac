use crosscope_core::board::BoardOrHost;

pub fn run(value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let target = BoardOrHost::parse(value);
    println!("target:      {target}");
    println!("board name:  {}", target.to_board_name());
    println!("sysroot:     {}", target.sysroot().display());
    println!("emerge tool: {}", target.suffixed_executable("emerge"));
    Ok(())
}
