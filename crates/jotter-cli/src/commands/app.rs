//! Interactive terminal flow over the shared screen controllers.
//!
//! The loop races the next input line against session changes from the
//! gate, so an expired session sends the user back to login even while the
//! app is idle at a prompt.

use std::sync::Arc;

use chrono::Locale;
use jotter_core::backend::Backend;
use jotter_core::display::locale_from_env;
use jotter_core::screens::{
    DetailView, Handled, ListView, LoginScreen, Navigator, NoteDetailScreen, NotesListScreen,
    Presenter, RegisterScreen, Route, SessionGate, MSG_NO_NOTES,
};

use crate::error::CliError;
use crate::terminal::{Terminal, TerminalPresenter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn run_app<B: Backend>(backend: Arc<B>, terminal: &Terminal) -> Result<(), CliError> {
    let nav = drive(backend, terminal).await?;
    tracing::debug!(route = %nav.current(), "app closed");
    Ok(())
}

/// Run until input ends or the user quits. Returns the final navigation state.
pub async fn drive<B: Backend>(
    backend: Arc<B>,
    terminal: &Terminal,
) -> Result<Navigator, CliError> {
    let ui = TerminalPresenter::new(terminal);
    let mut nav = Navigator::new();
    let mut gate = SessionGate::new(Arc::clone(&backend));
    gate.mount(&mut nav).await;

    let mut app = App::new(backend, locale_from_env());
    let mut needs_render = true;

    loop {
        if app.enter(&mut nav, &ui).await {
            needs_render = true;
        }
        if needs_render {
            for line in app.render(nav.current()) {
                println!("{line}");
            }
            needs_render = false;
        }
        terminal.show_prompt("> ")?;

        tokio::select! {
            biased;
            Some(change) = gate.next_change() => {
                if gate.handle_change(&change, &mut nav) {
                    println!();
                }
            }
            line = terminal.read_line() => {
                let Some(line) = line else {
                    break;
                };
                if app.dispatch(line.trim(), &mut nav, &ui, terminal).await? == Flow::Quit {
                    break;
                }
                needs_render = true;
            }
        }
    }

    app.leave();
    gate.unmount();
    Ok(nav)
}

struct App<B: Backend> {
    backend: Arc<B>,
    locale: Locale,
    shown: Option<Route>,
    login: LoginScreen<B>,
    register: RegisterScreen<B>,
    notes: NotesListScreen<B>,
    detail: Option<NoteDetailScreen<B>>,
}

impl<B: Backend> App<B> {
    fn new(backend: Arc<B>, locale: Locale) -> Self {
        Self {
            login: LoginScreen::new(Arc::clone(&backend)),
            register: RegisterScreen::new(Arc::clone(&backend)),
            notes: NotesListScreen::new(Arc::clone(&backend)).with_locale(locale),
            detail: None,
            shown: None,
            backend,
            locale,
        }
    }

    /// Mount whatever the navigator now points at. Returns `true` if anything changed.
    async fn enter<P: Presenter>(&mut self, nav: &mut Navigator, ui: &P) -> bool {
        let mut changed = false;
        while self.shown.as_ref() != Some(nav.current()) {
            changed = true;
            let previous = self.shown.take();
            self.leave_route(previous.as_ref());
            let route = nav.current().clone();
            self.shown = Some(route.clone());

            match route {
                Route::Index => {}
                Route::Login => self.login = LoginScreen::new(Arc::clone(&self.backend)),
                Route::Register => {
                    self.register = RegisterScreen::new(Arc::clone(&self.backend));
                }
                Route::Notes => {
                    if !matches!(previous, Some(Route::NoteDetail { .. })) {
                        self.notes = NotesListScreen::new(Arc::clone(&self.backend))
                            .with_locale(self.locale);
                    }
                    self.notes.on_focus(ui).await;
                }
                Route::NoteDetail { id } => {
                    let mut detail =
                        NoteDetailScreen::new(Arc::clone(&self.backend)).with_locale(self.locale);
                    detail.mount(id, nav, ui).await;
                    self.detail = Some(detail);
                }
            }
        }
        changed
    }

    fn leave(&mut self) {
        let shown = self.shown.take();
        self.leave_route(shown.as_ref());
    }

    fn leave_route(&mut self, route: Option<&Route>) {
        match route {
            Some(Route::Login) => self.login.unmount(),
            Some(Route::Register) => self.register.unmount(),
            Some(Route::Notes) => self.notes.unmount(),
            Some(Route::NoteDetail { .. }) => {
                if let Some(detail) = self.detail.take() {
                    detail.unmount();
                }
            }
            Some(Route::Index) | None => {}
        }
    }

    fn render(&self, route: &Route) -> Vec<String> {
        match route {
            Route::Index => Vec::new(),
            Route::Login => vec![
                "== Login ==".to_string(),
                "Commands: login, register, quit".to_string(),
            ],
            Route::Register => vec![
                "== Register ==".to_string(),
                "Commands: register, login, quit".to_string(),
            ],
            Route::Notes => {
                let mut lines = vec!["== Notes ==".to_string()];
                lines.extend(render_list(&self.notes.view()));
                if self.notes.form.visible {
                    lines.push("(new note form open: `new` to fill it in, `cancel` to close)".to_string());
                }
                lines.push(
                    "Commands: new, open <n>, delete <n>, refresh, signout, quit".to_string(),
                );
                lines
            }
            Route::NoteDetail { .. } => {
                let mut lines = vec!["== Note ==".to_string()];
                if let Some(detail) = &self.detail {
                    lines.extend(render_detail(&detail.view()));
                }
                lines.push("Commands: title, content, save, back, quit".to_string());
                lines
            }
        }
    }

    async fn dispatch<P: Presenter>(
        &mut self,
        line: &str,
        nav: &mut Navigator,
        ui: &P,
        terminal: &Terminal,
    ) -> Result<Flow, CliError> {
        let (command, argument) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(command, rest)| (command, rest.trim()));
        match command {
            "" => return Ok(Flow::Continue),
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            _ => {}
        }

        let handled = match nav.current().clone() {
            Route::Login => match command {
                "login" => {
                    let Some(email) = terminal.prompt("Email").await? else {
                        return Ok(Flow::Quit);
                    };
                    let Some(password) = terminal.prompt("Password").await? else {
                        return Ok(Flow::Quit);
                    };
                    self.login.email = email.trim().to_string();
                    self.login.password = password;
                    Some(self.login.submit(nav, ui).await)
                }
                "register" => {
                    self.login.open_register(nav);
                    Some(Handled::Done)
                }
                _ => None,
            },
            Route::Register => match command {
                "register" => {
                    let Some(email) = terminal.prompt("Email").await? else {
                        return Ok(Flow::Quit);
                    };
                    let Some(password) = terminal.prompt("Password").await? else {
                        return Ok(Flow::Quit);
                    };
                    let Some(confirm) = terminal.prompt("Confirm password").await? else {
                        return Ok(Flow::Quit);
                    };
                    self.register.email = email.trim().to_string();
                    self.register.password = password;
                    self.register.confirm_password = confirm;
                    Some(self.register.submit(nav, ui).await)
                }
                "login" | "back" => {
                    self.register.open_login(nav);
                    Some(Handled::Done)
                }
                _ => None,
            },
            Route::Notes => match command {
                "new" => {
                    if !self.notes.form.visible {
                        self.notes.toggle_form();
                    }
                    let Some(title) = terminal.prompt("Title").await? else {
                        return Ok(Flow::Quit);
                    };
                    let Some(content) = terminal.prompt("Content").await? else {
                        return Ok(Flow::Quit);
                    };
                    self.notes.form.title = title;
                    self.notes.form.content = content;
                    Some(self.notes.create_note(ui).await)
                }
                "cancel" => {
                    if self.notes.form.visible {
                        self.notes.toggle_form();
                    }
                    Some(Handled::Done)
                }
                "open" => self.row_id(argument).map(|id| {
                    self.notes.open_note(&id, nav);
                    Handled::Done
                }),
                "delete" => match self.row_id(argument) {
                    Some(id) => Some(self.notes.request_delete(&id, ui).await),
                    None => None,
                },
                "refresh" => Some(self.notes.refresh(ui).await),
                "signout" | "logout" => Some(self.notes.sign_out(nav).await),
                _ => None,
            },
            Route::NoteDetail { .. } => {
                let Some(detail) = self.detail.as_mut() else {
                    return Ok(Flow::Continue);
                };
                match command {
                    "title" => {
                        let value = if argument.is_empty() {
                            let Some(value) = terminal.prompt("Title").await? else {
                                return Ok(Flow::Quit);
                            };
                            value
                        } else {
                            argument.to_string()
                        };
                        detail.title = value;
                        Some(Handled::Done)
                    }
                    "content" => {
                        let value = if argument.is_empty() {
                            let Some(value) = terminal.prompt("Content").await? else {
                                return Ok(Flow::Quit);
                            };
                            value
                        } else {
                            argument.to_string()
                        };
                        detail.content = value;
                        Some(Handled::Done)
                    }
                    "save" => Some(detail.save(ui).await),
                    "back" => {
                        nav.back();
                        Some(Handled::Done)
                    }
                    _ => None,
                }
            }
            Route::Index => None,
        };

        match handled {
            Some(outcome) => tracing::debug!(command, ?outcome, "command handled"),
            None => println!("Unknown command `{line}`."),
        }
        Ok(Flow::Continue)
    }

    /// Note id of the 1-based row `argument`.
    fn row_id(&self, argument: &str) -> Option<jotter_core::NoteId> {
        let index = argument.parse::<usize>().ok()?.checked_sub(1)?;
        self.notes.notes().get(index).map(|note| note.id.clone())
    }
}

pub fn render_list(view: &ListView) -> Vec<String> {
    match view {
        ListView::Loading => vec!["Loading...".to_string()],
        ListView::Empty => vec![MSG_NO_NOTES.to_string()],
        ListView::Notes(rows) => rows
            .iter()
            .enumerate()
            .flat_map(|(index, row)| {
                let mut lines = vec![format!("{:>3}. {}  ({})", index + 1, row.title, row.created)];
                lines.extend(row.preview.lines().map(|line| format!("     {line}")));
                lines
            })
            .collect(),
    }
}

pub fn render_detail(view: &DetailView) -> Vec<String> {
    match view {
        DetailView::Loading => vec!["Loading...".to_string()],
        DetailView::Editing {
            title,
            content,
            last_updated,
            saving,
        } => {
            let mut lines = vec![format!("Title: {title}")];
            lines.extend(content.lines().map(ToString::to_string));
            lines.push(last_updated.clone());
            if *saving {
                lines.push("Saving...".to_string());
            }
            lines
        }
    }
}
