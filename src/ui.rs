// UI layer: interactive prompts via `dialoguer` plus the console output
// helpers (banners, progress). Prompting goes through the `Prompt` trait so
// the bootstrap and run-option loops can be driven by canned answers in
// tests; `ConsolePrompt` is the real terminal implementation.

use anyhow::Result;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::nav::{MenuEntry, Selection};

/// Interactive input boundary. Implementations are synchronous; prompting
/// never overlaps with in-flight downloads.
pub trait Prompt {
    fn input(&self, message: &str) -> Result<String>;
    fn password(&self, message: &str) -> Result<String>;
    fn confirm(&self, message: &str) -> Result<bool>;
    /// Pick one of `items`; returns the selected index.
    fn choose(&self, message: &str, items: &[String]) -> Result<usize>;
}

/// Terminal-backed prompt implementation.
pub struct ConsolePrompt;

impl Prompt for ConsolePrompt {
    fn input(&self, message: &str) -> Result<String> {
        let value: String = Input::new().with_prompt(message).interact_text()?;
        Ok(value)
    }

    fn password(&self, message: &str) -> Result<String> {
        let value: String = Password::new().with_prompt(message).interact()?;
        Ok(value)
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        let value = Confirm::new().with_prompt(message).interact()?;
        Ok(value)
    }

    fn choose(&self, message: &str, items: &[String]) -> Result<usize> {
        let selection = Select::new()
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact()?;
        Ok(selection)
    }
}

/// Present one navigation menu round: info rows are printed above the list,
/// the rest become the selectable items.
pub fn select_from_menu(prompt: &dyn Prompt, entries: &[MenuEntry]) -> Result<Selection> {
    let mut selectable = Vec::new();
    let mut labels = Vec::new();
    for entry in entries {
        match entry {
            MenuEntry::Info(text) => println!("{}", text),
            MenuEntry::Process => {
                labels.push(crate::nav::PROCESS_LABEL.to_string());
                selectable.push(entry.clone());
            }
            MenuEntry::Ascend => {
                labels.push(crate::nav::ASCEND_LABEL.to_string());
                selectable.push(entry.clone());
            }
            MenuEntry::Folder(name) => {
                labels.push(name.clone());
                selectable.push(entry.clone());
            }
        }
    }
    let index = prompt.choose("Choose a folder or process the documents", &labels)?;
    Ok(match &selectable[index] {
        MenuEntry::Process => Selection::Process,
        MenuEntry::Ascend => Selection::Ascend,
        MenuEntry::Folder(name) => Selection::Descend(name.clone()),
        MenuEntry::Info(_) => unreachable!("info rows are never selectable"),
    })
}

/// Bracketed failure banner, matching the output shape operators of the
/// original tool are used to.
pub fn banner(lines: &[&str]) {
    println!();
    println!("*******************************************************");
    for line in lines {
        println!("{}", line);
    }
    println!("*******************************************************");
    println!();
}

/// Spinner shown while a single remote call is in flight.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Progress bar over the pages of one document.
pub fn page_bar(pages: u64) -> ProgressBar {
    let pb = ProgressBar::new(pages);
    if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} pages") {
        pb.set_style(style);
    }
    pb
}
