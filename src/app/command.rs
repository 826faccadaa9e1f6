//! Command parsing for the command line

/// Parsed command from the command line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Report video playback: :watch <seconds>[/<duration>]
    Watch { seconds: f64, duration: Option<f64> },
    /// Report how far the text has been read: :scroll <percent>
    Scroll(f64),
    /// Add file viewing time: :view <seconds>
    View(u64),
    /// Answer the quiz, options numbered from 1: :quiz 2 1 4
    QuizAnswers(Vec<usize>),
    /// Report a raw quiz score: :quiz 8/10
    QuizScore { score: f64, total: f64 },
    /// Complete the current lesson and move on: :complete
    Complete,
    /// Next lesson: :next or :n
    Next,
    /// Previous lesson: :prev or :p
    Prev,
    /// Open a lesson by 1-based position: :goto 2.3
    Goto { module: usize, lesson: usize },
    /// Mark all notifications read: :read
    ReadAll,
    /// Quit the application: :q or :quit
    Quit,
    /// Show help: :help or :h
    Help,
    /// Clear message: (empty command)
    Nop,
}

/// Result of parsing a command
#[derive(Debug)]
pub enum ParseResult {
    /// Successfully parsed command
    Ok(Command),
    /// Unknown command
    UnknownCommand(String),
    /// Command needs an argument
    MissingArgument(String),
    /// Argument could not be understood
    InvalidArgument(String, String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> ParseResult {
    let input = input.trim();

    if input.is_empty() {
        return ParseResult::Ok(Command::Nop);
    }

    // Split into command and arguments
    let mut parts = input.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim()).unwrap_or("");

    let name = cmd.to_lowercase();
    let needs_arg = matches!(name.as_str(), "watch" | "w" | "scroll" | "s" | "view" | "v" | "quiz" | "goto" | "g");
    if needs_arg && args.is_empty() {
        return ParseResult::MissingArgument(name);
    }
    let invalid = || ParseResult::InvalidArgument(name.clone(), args.to_string());

    match name.as_str() {
        "watch" | "w" => match parse_ratio(args) {
            Some((seconds, duration)) => ParseResult::Ok(Command::Watch { seconds, duration }),
            None => invalid(),
        },
        "scroll" | "s" => match args.trim_end_matches('%').parse::<f64>() {
            Ok(percent) if percent.is_finite() => ParseResult::Ok(Command::Scroll(percent)),
            _ => invalid(),
        },
        "view" | "v" => match args.trim_end_matches('s').parse::<u64>() {
            Ok(seconds) => ParseResult::Ok(Command::View(seconds)),
            Err(_) => invalid(),
        },
        "quiz" => {
            if args.contains('/') {
                return match parse_ratio(args) {
                    Some((score, Some(total))) => ParseResult::Ok(Command::QuizScore { score, total }),
                    _ => invalid(),
                };
            }
            let answers: Option<Vec<usize>> = args
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<usize>().ok().and_then(|n| n.checked_sub(1)))
                .collect();
            match answers {
                Some(answers) => ParseResult::Ok(Command::QuizAnswers(answers)),
                None => invalid(),
            }
        }
        "complete" | "c" | "done" => ParseResult::Ok(Command::Complete),
        "next" | "n" => ParseResult::Ok(Command::Next),
        "prev" | "p" | "previous" => ParseResult::Ok(Command::Prev),
        "goto" | "g" => {
            let position = args.split_once('.').and_then(|(m, l)| {
                let module = m.trim().parse::<usize>().ok()?.checked_sub(1)?;
                let lesson = l.trim().parse::<usize>().ok()?.checked_sub(1)?;
                Some((module, lesson))
            });
            match position {
                Some((module, lesson)) => ParseResult::Ok(Command::Goto { module, lesson }),
                None => invalid(),
            }
        }
        "read" | "read-all" => ParseResult::Ok(Command::ReadAll),
        "quit" | "q" => ParseResult::Ok(Command::Quit),
        "help" | "h" | "?" => ParseResult::Ok(Command::Help),
        _ => ParseResult::UnknownCommand(cmd.to_string()),
    }
}

/// Parse `a` or `a/b` into non-negative numbers
fn parse_ratio(args: &str) -> Option<(f64, Option<f64>)> {
    let number = |s: &str| s.trim().parse::<f64>().ok().filter(|n| n.is_finite() && *n >= 0.0);
    match args.split_once('/') {
        Some((a, b)) => Some((number(a)?, Some(number(b)?))),
        None => Some((number(args)?, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_command() {
        assert!(matches!(parse_command("q"), ParseResult::Ok(Command::Quit)));
        assert!(matches!(parse_command("quit"), ParseResult::Ok(Command::Quit)));
        assert!(matches!(parse_command("Q"), ParseResult::Ok(Command::Quit)));
    }

    #[test]
    fn parse_watch_with_and_without_duration() {
        match parse_command("watch 96") {
            ParseResult::Ok(Command::Watch { seconds, duration }) => {
                assert_eq!(seconds, 96.0);
                assert_eq!(duration, None);
            }
            other => panic!("Expected Watch command, got {:?}", other),
        }
        assert!(matches!(
            parse_command("w 57/60"),
            ParseResult::Ok(Command::Watch { duration: Some(d), .. }) if d == 60.0
        ));
    }

    #[test]
    fn parse_scroll_accepts_percent_sign() {
        assert!(matches!(parse_command("scroll 90%"), ParseResult::Ok(Command::Scroll(p)) if p == 90.0));
        assert!(matches!(parse_command("scroll far"), ParseResult::InvalidArgument(_, _)));
    }

    #[test]
    fn parse_view_seconds() {
        assert!(matches!(parse_command("view 12s"), ParseResult::Ok(Command::View(12))));
    }

    #[test]
    fn parse_quiz_answers_are_zero_based() {
        match parse_command("quiz 2, 1 4") {
            ParseResult::Ok(Command::QuizAnswers(answers)) => assert_eq!(answers, vec![1, 0, 3]),
            other => panic!("Expected QuizAnswers, got {:?}", other),
        }
        assert!(matches!(parse_command("quiz 0"), ParseResult::InvalidArgument(_, _)));
    }

    #[test]
    fn parse_quiz_score() {
        assert!(matches!(
            parse_command("quiz 8/10"),
            ParseResult::Ok(Command::QuizScore { score, total }) if score == 8.0 && total == 10.0
        ));
        assert!(matches!(parse_command("quiz 8/"), ParseResult::InvalidArgument(_, _)));
    }

    #[test]
    fn parse_goto_command() {
        assert!(matches!(
            parse_command("goto 2.3"),
            ParseResult::Ok(Command::Goto { module: 1, lesson: 2 })
        ));
        assert!(matches!(parse_command("goto 2"), ParseResult::InvalidArgument(_, _)));
        assert!(matches!(parse_command("goto 0.1"), ParseResult::InvalidArgument(_, _)));
    }

    #[test]
    fn parse_missing_args() {
        assert!(matches!(parse_command("watch"), ParseResult::MissingArgument(_)));
        assert!(matches!(parse_command("goto"), ParseResult::MissingArgument(_)));
    }

    #[test]
    fn parse_navigation() {
        assert!(matches!(parse_command("next"), ParseResult::Ok(Command::Next)));
        assert!(matches!(parse_command("p"), ParseResult::Ok(Command::Prev)));
        assert!(matches!(parse_command("complete"), ParseResult::Ok(Command::Complete)));
    }

    #[test]
    fn parse_unknown_command() {
        assert!(matches!(parse_command("unknown"), ParseResult::UnknownCommand(_)));
    }

    #[test]
    fn parse_empty_is_nop() {
        assert!(matches!(parse_command(""), ParseResult::Ok(Command::Nop)));
        assert!(matches!(parse_command("   "), ParseResult::Ok(Command::Nop)));
    }
}
