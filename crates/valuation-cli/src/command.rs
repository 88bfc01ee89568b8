//! REPL command parsing

use valuation_client::ParamField;

/// A parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    LoadMore,
    Analyze(String),
    Set(ParamField, String),
    Help,
    Exit,
}

/// Parse one input line
///
/// Plain text without a leading `/` is treated as a search keyword.
pub fn parse_command(input: &str) -> Result<Command, String> {
    let input = input.trim();
    let Some(rest) = input.strip_prefix('/') else {
        return Ok(Command::Search(input.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match (name, args.as_slice()) {
        ("search" | "s", _) => Ok(Command::Search(args.join(" "))),
        ("more" | "m", []) => Ok(Command::LoadMore),
        ("analyze" | "a", [code]) => Ok(Command::Analyze((*code).to_string())),
        ("analyze" | "a", _) => Err("用法: /analyze <股票代码>".to_string()),
        ("set", [field, value]) => Ok(Command::Set(field.parse()?, (*value).to_string())),
        ("set", _) => Err("用法: /set <discount|growth|period> <值>".to_string()),
        ("help" | "h", _) => Ok(Command::Help),
        ("exit" | "quit" | "q", _) => Ok(Command::Exit),
        (other, _) => Err(format!("未知命令: /{other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_search() {
        assert_eq!(parse_command("  贵州 "), Ok(Command::Search("贵州".to_string())));
        assert_eq!(
            parse_command("/search 中国 平安"),
            Ok(Command::Search("中国 平安".to_string()))
        );
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_command("/more"), Ok(Command::LoadMore));
        assert_eq!(
            parse_command("/a 600519"),
            Ok(Command::Analyze("600519".to_string()))
        );
        assert_eq!(
            parse_command("/set growth 4.5"),
            Ok(Command::Set(ParamField::GrowthRate, "4.5".to_string()))
        );
        assert_eq!(parse_command("/exit"), Ok(Command::Exit));
    }

    #[test]
    fn test_bad_commands() {
        assert!(parse_command("/analyze").is_err());
        assert!(parse_command("/set beta 1").is_err());
        assert!(parse_command("/frobnicate").is_err());
    }
}
