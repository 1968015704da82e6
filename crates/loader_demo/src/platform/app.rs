use anyhow::Context;
use loader_engine::{
    ControllerSettings, LoadController, Phase, Presentation, RenderOutcome,
};
use loader_logging::{loader_info, loader_warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use super::data_source::{
    DemoFetchError, DisplayMode, Tab, TabContentSource, TabListSource, ROOT_VIEW_ID,
};
use super::render::{render_content, render_local, render_root, render_screen, HELP};
use super::settings::DemoSettings;

type RootController = LoadController<&'static str, Vec<Tab>, DemoFetchError>;
type ContentController = LoadController<Tab, String, DemoFetchError>;

const CONTENT_LABEL: &str = "tab-content";

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostCommand {
    /// 1-based tab index as typed by the user.
    Select(usize),
    Retry,
    Hide,
    Show,
    Tabs,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<HostCommand> {
    let word = line.trim();
    if word.is_empty() {
        return None;
    }
    let command = match word.to_ascii_lowercase().as_str() {
        "retry" | "r" => HostCommand::Retry,
        "hide" => HostCommand::Hide,
        "show" => HostCommand::Show,
        "tabs" => HostCommand::Tabs,
        "help" | "?" => HostCommand::Help,
        "quit" | "q" | "exit" => HostCommand::Quit,
        other => match other.parse::<usize>() {
            Ok(index) => HostCommand::Select(index),
            Err(_) => HostCommand::Unknown(word.to_string()),
        },
    };
    Some(command)
}

pub async fn run_app(settings: DemoSettings) -> anyhow::Result<()> {
    loader_info!(
        "loader_demo starting (delay={:?}, placeholder={})",
        settings.fetch_delay(),
        settings.placeholder
    );
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    let root: RootController = LoadController::spawn(
        TabListSource::new(settings.fetch_delay(), settings.flaky_tab_list),
        ROOT_VIEW_ID,
        ControllerSettings {
            placeholder: settings.placeholder,
            ..ControllerSettings::labelled(ROOT_VIEW_ID)
        },
    )?;
    root.on_identity_changed(ROOT_VIEW_ID);

    let Some(tabs) = wait_for_tabs(&root, &mut input).await? else {
        return Ok(());
    };
    let Some(first) = tabs.first().cloned() else {
        println!("The server returned no tabs.");
        return Ok(());
    };

    let content: ContentController = LoadController::spawn(
        TabContentSource::new(settings.fetch_delay(), settings.flaky_tabs.clone()),
        first,
        ControllerSettings {
            placeholder: settings.placeholder,
            ..ControllerSettings::labelled(CONTENT_LABEL)
        },
    )?;

    let mut screen = Screen::new(tabs, content);
    screen.run(&mut input).await?;
    loader_info!("loader_demo finished");
    Ok(())
}

/// Drives the root controller until the tab list is available. Returns `None` when
/// the user quits first.
async fn wait_for_tabs<R>(
    root: &RootController,
    input: &mut Lines<R>,
) -> anyhow::Result<Option<Vec<Tab>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut updates = root.subscribe();
    let initial = updates.borrow_and_update().clone();
    print_lines(render_root(initial.phase.outcome()));

    loop {
        tokio::select! {
            changed = updates.changed() => {
                changed.context("tab list controller stopped")?;
                let operation = updates.borrow_and_update().clone();
                print_lines(render_root(operation.phase.outcome()));
                if let Phase::Loaded(tabs) = operation.phase {
                    return Ok(Some(tabs));
                }
            }
            line = input.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    return Ok(None);
                };
                match parse_command(&line) {
                    Some(HostCommand::Retry) => retry_root(root),
                    Some(HostCommand::Quit) => return Ok(None),
                    Some(HostCommand::Help) => println!("{HELP}"),
                    Some(_) => println!("Tabs are not loaded yet."),
                    None => {}
                }
            }
        }
    }
}

/// The root view never re-appears, so a tab-list fetch that died without a result
/// is restarted by announcing the root identity again.
fn retry_root(root: &RootController) {
    match root.present() {
        Presentation::Failed { retry, .. } => retry.retry(),
        Presentation::Loading => {
            println!("Restarting the tab list request.");
            root.on_identity_changed(ROOT_VIEW_ID);
        }
        Presentation::Content(_) => println!("Nothing to retry."),
    }
}

struct Screen {
    tabs: Vec<Tab>,
    selected: usize,
    visible: bool,
    content: ContentController,
}

impl Screen {
    fn new(tabs: Vec<Tab>, content: ContentController) -> Self {
        Self {
            tabs,
            selected: 0,
            visible: true,
            content,
        }
    }

    async fn run<R>(&mut self, input: &mut Lines<R>) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut updates = self.content.subscribe();
        self.announce_selected();
        self.redraw();

        loop {
            tokio::select! {
                changed = updates.changed() => {
                    changed.context("content controller stopped")?;
                    updates.borrow_and_update();
                    if self.selected_tab().display_mode() == DisplayMode::Remote {
                        self.redraw();
                    }
                }
                line = input.next_line() => {
                    let Some(line) = line.context("failed to read stdin")? else {
                        return Ok(());
                    };
                    let Some(command) = parse_command(&line) else {
                        continue;
                    };
                    if !self.handle(command) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Applies one user command. Returns `false` when the user asked to quit.
    fn handle(&mut self, command: HostCommand) -> bool {
        match command {
            HostCommand::Select(index) => {
                if index == 0 || index > self.tabs.len() {
                    println!("There is no tab {index}.");
                } else {
                    self.selected = index - 1;
                    self.announce_selected();
                    self.redraw();
                }
            }
            HostCommand::Retry => match self.content.present() {
                Presentation::Failed { retry, .. } => retry.retry(),
                _ => println!("Nothing to retry."),
            },
            HostCommand::Hide => {
                self.visible = false;
                self.content.cancel();
                println!("(screen hidden; `show` to bring it back)");
            }
            HostCommand::Show => {
                self.visible = true;
                self.announce_selected();
                self.redraw();
            }
            HostCommand::Tabs => self.redraw(),
            HostCommand::Help => println!("{HELP}"),
            HostCommand::Quit => return false,
            HostCommand::Unknown(word) => {
                loader_warn!("unknown command {:?}", word);
                println!("Unknown command {word:?}. {HELP}");
            }
        }
        true
    }

    fn selected_tab(&self) -> &Tab {
        &self.tabs[self.selected]
    }

    /// Re-announces on every selection and every time the screen becomes visible;
    /// the controller drops announcements it has already served.
    fn announce_selected(&self) {
        if !self.visible {
            return;
        }
        let tab = self.selected_tab();
        if tab.display_mode() == DisplayMode::Remote {
            self.content.on_identity_changed(tab.clone());
        }
    }

    fn redraw(&self) {
        if !self.visible {
            return;
        }
        let tab = self.selected_tab();
        let body = match tab.display_mode() {
            DisplayMode::Local => render_local(),
            DisplayMode::Remote => {
                let operation = self.content.operation();
                // A phase recorded for another tab is never shown for this one.
                if operation.id == *tab {
                    render_content(operation.phase.outcome())
                } else {
                    render_content(RenderOutcome::Loading)
                }
            }
        };
        print_lines(render_screen(&self.tabs, self.selected, body));
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
