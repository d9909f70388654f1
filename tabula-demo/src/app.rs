//! Demo screen: a searchable user table with a remembered name.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tabula::prelude::*;

use crate::users::{SampleDirectory, User};

/// Delay between the last keystroke and the search applying.
const SEARCH_DELAY: Duration = Duration::from_millis(300);

/// Simulated latency of the user directory.
const FETCH_LATENCY: Duration = Duration::from_millis(400);

/// Attributes the search box matches against.
const SEARCH_KEYS: &[&str] = &["name", "email"];

pub const HELP: &str = "\
commands:
  search <text>   filter users by name or email
  sort <column>   sort by column (again to reverse)
  unsort          restore input order
  click <n>       select the n-th displayed row
  name <text>     remember your name
  forget          forget your name
  reload          fetch users again
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Sort(String),
    Unsort,
    Click(usize),
    Name(String),
    Forget,
    Reload,
    Quit,
}

impl Command {
    /// Parse one input line. Returns `None` for anything unrecognised.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match word {
            "search" => Some(Self::Search(rest.to_string())),
            "sort" if !rest.is_empty() => Some(Self::Sort(rest.to_string())),
            "unsort" => Some(Self::Unsort),
            "click" => rest.parse::<usize>().ok().filter(|&n| n > 0).map(Self::Click),
            "name" => Some(Self::Name(rest.to_string())),
            "forget" => Some(Self::Forget),
            "reload" => Some(Self::Reload),
            "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub struct Demo {
    users: Fetcher<Vec<User>>,
    search: Debounced<String>,
    name: Persisted<String>,
    table: DataTable<User>,
    selected: State<Option<User>>,
}

impl Demo {
    /// Build the screen. Every asynchronous change signals `wakeup`.
    pub fn new(store: Arc<dyn KeyValueStore>, wakeup: WakeupSender) -> Self {
        let users: Fetcher<Vec<User>> =
            Fetcher::spawn(Arc::new(SampleDirectory::new(FETCH_LATENCY)));
        users.resource().install_wakeup(wakeup.clone());

        let search = Debounced::new(
            String::new(),
            SEARCH_DELAY,
            Arc::new(TokioScheduler::current()),
        );
        search.output().install_wakeup(wakeup);

        let selected = State::new(None);
        let on_click = selected.clone();
        let table = DataTable::new(columns())
            .empty_message("No users found")
            .on_row_click(move |user: &User| on_click.set(Some(user.clone())));

        Self {
            users,
            search,
            name: Persisted::bind(store, "demo-name", String::new()),
            table,
            selected,
        }
    }

    /// Apply a command. Returns `false` once the user quits.
    pub fn apply(&mut self, command: Command) -> bool {
        log::debug!("Command: {:?}", command);
        match command {
            Command::Search(text) => self.search.set(text),
            Command::Sort(key) => {
                if !self.table.activate_column(&key) {
                    println!("'{}' is not a sortable column", key);
                }
            }
            Command::Unsort => self.table.clear_sort(),
            Command::Click(n) => {
                if let ResourceState::Ready(users) = self.users.resource().get() {
                    let hits = filter_rows(&users, &self.search.get(), SEARCH_KEYS);
                    self.table.activate_row(&hits, n - 1);
                }
            }
            Command::Name(name) => self.name.set(name),
            Command::Forget => self.name.remove(),
            Command::Reload => self.users.refetch(),
            Command::Quit => return false,
        }
        true
    }

    /// Render the whole screen as text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let name = self.name.get();
        if name.is_empty() {
            let _ = writeln!(out, "Hello! (set your name with `name <text>`)");
        } else {
            let _ = writeln!(out, "Hello, {}!", name);
        }

        let pending = if self.search.is_pending() { " …" } else { "" };
        let _ = writeln!(out, "Search: {:?}{}", self.search.input(), pending);
        out.push('\n');

        let view = match self.users.resource().get() {
            ResourceState::Idle | ResourceState::Loading => self.table.view(&[] as &[User], true),
            ResourceState::Error(e) => {
                let _ = write!(out, "Error: {}", e);
                return out;
            }
            ResourceState::Ready(users) => {
                let hits = filter_rows(&users, &self.search.get(), SEARCH_KEYS);
                self.table.view(&hits, false)
            }
        };
        let _ = write!(out, "{}", view);

        if let Some(user) = self.selected.get() {
            let _ = write!(out, "\n\nSelected: {} <{}>", user.name, user.email);
        }
        out
    }
}

fn columns() -> Vec<Column<User>> {
    vec![
        Column::new("name", "Name").sortable(),
        Column::new("email", "Email").sortable(),
        Column::new("age", "Age").sortable().width("100px"),
        Column::new("role", "Role")
            .sortable()
            .render(|role, _: &User| role.to_string().to_uppercase()),
        Column::new("isActive", "Status").render(|_, user: &User| {
            let status = if user.is_active { "Active" } else { "Inactive" };
            status.to_string()
        }),
    ]
}
