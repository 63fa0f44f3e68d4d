use std::io::{self, BufRead, Write};

use shared::{ActiveUser, UserSummary};

use super::UserInterface;

/// Console rendering of the user list, with line-based prompts. Backs the
/// demo binary.
pub struct ConsoleInterface;

impl ConsoleInterface {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(_) => None,
        }
    }
}

impl Default for ConsoleInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl UserInterface for ConsoleInterface {
    fn render(&mut self, users: &[UserSummary], current: Option<&ActiveUser>) {
        println!("--- ユーザー一覧 ---");
        for user in users {
            let marker = if current.is_some_and(|c| c.personal_id == user.personal_id) {
                "*"
            } else {
                " "
            };
            println!("{} {}  [{}]", marker, user.user_name, user.personal_id);
        }
    }

    fn prompt(&mut self, message: &str) -> Option<String> {
        print!("{}: ", message);
        let _ = io::stdout().flush();
        self.read_line().filter(|input| !input.is_empty())
    }

    fn confirm(&mut self, message: &str) -> bool {
        print!("{} (y/n): ", message);
        let _ = io::stdout().flush();
        self.read_line()
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y"))
    }

    fn alert(&mut self, message: &str) {
        println!("⚠️ {}", message);
    }
}
