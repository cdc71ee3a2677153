// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

fn main() -> std::process::ExitCode {
    rsh::log::init();

    match rsh::shell::run() {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn exit_code(code: i32) -> std::process::ExitCode {
    u8::try_from(code.rem_euclid(256)).map(std::process::ExitCode::from).unwrap_or(std::process::ExitCode::FAILURE)
}
