use loader_engine::RenderOutcome;

use super::data_source::{DemoFetchError, Tab, LOCAL_CONTENT};

pub const HELP: &str = "commands: <n> select tab, retry, hide, show, tabs, quit";

pub fn render_root(outcome: RenderOutcome<&Vec<Tab>, &DemoFetchError>) -> Vec<String> {
    match outcome {
        RenderOutcome::Loading => vec!["Loading tabs...".to_string()],
        RenderOutcome::Content(tabs) => vec![format!("Loaded {} tabs", tabs.len())],
        RenderOutcome::Failed(_) => vec![
            "Error Loading Initial Tabs".to_string(),
            "type `retry` to try again".to_string(),
        ],
    }
}

pub fn render_tab_bar(tabs: &[Tab], selected: usize) -> String {
    tabs.iter()
        .enumerate()
        .map(|(index, tab)| {
            if index == selected {
                format!("[{} {}]", index + 1, tab.title)
            } else {
                format!(" {} {} ", index + 1, tab.title)
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

pub fn render_content(outcome: RenderOutcome<&String, &DemoFetchError>) -> Vec<String> {
    match outcome {
        RenderOutcome::Loading => vec!["... Fetching Information...".to_string()],
        RenderOutcome::Content(text) => vec![text.clone()],
        RenderOutcome::Failed(error) => vec![error.to_string(), "[Retry]".to_string()],
    }
}

pub fn render_local() -> Vec<String> {
    vec![LOCAL_CONTENT.to_string()]
}

pub fn render_screen(tabs: &[Tab], selected: usize, body: Vec<String>) -> Vec<String> {
    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(render_tab_bar(tabs, selected));
    lines.push(String::new());
    lines.extend(body);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_bar_marks_selection() {
        let tabs = vec![Tab::new("Skate"), Tab::new("Bike")];
        assert_eq!(render_tab_bar(&tabs, 1), " 1 Skate |[2 Bike]");
    }

    #[test]
    fn content_outcomes_map_to_three_views() {
        let text = "hello".to_string();
        let error = DemoFetchError::Unavailable("Boat".to_string());

        assert_eq!(
            render_content(RenderOutcome::Loading),
            vec!["... Fetching Information...".to_string()]
        );
        assert_eq!(
            render_content(RenderOutcome::Content(&text)),
            vec!["hello".to_string()]
        );
        let failed = render_content(RenderOutcome::Failed(&error));
        assert_eq!(failed[0], error.to_string());
        assert_eq!(failed[1], "[Retry]");
    }

    #[test]
    fn root_failure_has_its_own_message() {
        let error = DemoFetchError::Unavailable("the tab list".to_string());
        let lines = render_root(RenderOutcome::Failed(&error));
        assert_eq!(lines[0], "Error Loading Initial Tabs");
    }

    #[test]
    fn screen_puts_tab_bar_first() {
        let tabs = vec![Tab::new("Feet")];
        let lines = render_screen(&tabs, 0, render_local());
        assert_eq!(lines[0], "[1 Feet]");
        assert_eq!(lines[2], LOCAL_CONTENT);
    }
}
