//! 交互命令解析
//!
//! 一行一条命令：
//! `move <走法>` | `camera <θ> <φ> <r>` | `light <θ> <φ> <r>` | `power <p>` | `quit`

use crate::error::CommandError;
use crate::view::{checked_power, Orbit};

/// 用户命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 走棋（走法字符串由规则库解析）
    Move(String),
    /// 设置相机位置
    Camera(Orbit),
    /// 设置灯光位置
    Light(Orbit),
    /// 设置灯光强度
    Power(f32),
    /// 退出
    Quit,
}

impl Command {
    /// 解析一行输入；数值参数越界也视为格式错误
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = tokens.collect();

        match keyword {
            "move" => {
                expect_args("move", &args, 1)?;
                Ok(Command::Move(args[0].to_string()))
            }
            "camera" => Ok(Command::Camera(parse_orbit("camera", &args)?)),
            "light" => Ok(Command::Light(parse_orbit("light", &args)?)),
            "power" => {
                expect_args("power", &args, 1)?;
                Ok(Command::Power(checked_power(parse_number(args[0])?)?))
            }
            "quit" => {
                expect_args("quit", &args, 0)?;
                Ok(Command::Quit)
            }
            other => Err(CommandError::UnknownCommand {
                keyword: other.to_string(),
            }),
        }
    }
}

fn expect_args(command: &'static str, args: &[&str], expected: usize) -> Result<(), CommandError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CommandError::ArgumentCount {
            command,
            expected,
            got: args.len(),
        })
    }
}

fn parse_number(text: &str) -> Result<f32, CommandError> {
    text.parse().map_err(|_| CommandError::InvalidNumber {
        value: text.to_string(),
    })
}

fn parse_orbit(command: &'static str, args: &[&str]) -> Result<Orbit, CommandError> {
    expect_args(command, args, 3)?;
    Orbit::checked(
        parse_number(args[0])?,
        parse_number(args[1])?,
        parse_number(args[2])?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(
            Command::parse("move e2e4"),
            Ok(Command::Move("e2e4".to_string()))
        );
        assert_eq!(
            Command::parse("  move   a7a8q \n"),
            Ok(Command::Move("a7a8q".to_string()))
        );
        assert!(matches!(
            Command::parse("move"),
            Err(CommandError::ArgumentCount { expected: 1, got: 0, .. })
        ));
    }

    #[test]
    fn test_parse_camera_and_light() {
        assert_eq!(
            Command::parse("camera 45 90 30"),
            Ok(Command::Camera(Orbit::new(45.0, 90.0, 30.0)))
        );
        assert_eq!(
            Command::parse("light 10 360 0.5"),
            Ok(Command::Light(Orbit::new(10.0, 360.0, 0.5)))
        );
        assert!(matches!(
            Command::parse("camera 5 90 30"),
            Err(CommandError::OutOfRange { what: "theta", .. })
        ));
        assert!(matches!(
            Command::parse("light 45 90 -2"),
            Err(CommandError::OutOfRange { what: "radius", .. })
        ));
        assert!(matches!(
            Command::parse("camera 45 ninety 30"),
            Err(CommandError::InvalidNumber { .. })
        ));
        assert!(matches!(
            Command::parse("camera 45 90"),
            Err(CommandError::ArgumentCount { expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn test_parse_power() {
        assert_eq!(Command::parse("power 250"), Ok(Command::Power(250.0)));
        assert!(Command::parse("power 0").is_err());
        assert!(Command::parse("power abc").is_err());
    }

    #[test]
    fn test_parse_quit_and_unknown() {
        assert_eq!(Command::parse("quit"), Ok(Command::Quit));
        assert_eq!(Command::parse(""), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("castle e1g1"),
            Err(CommandError::UnknownCommand {
                keyword: "castle".to_string()
            })
        );
    }
}
