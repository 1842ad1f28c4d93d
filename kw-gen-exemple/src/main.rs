use std::io::{self, BufRead, Write};

use kw_gen_core::Session;
use kw_gen_core::model::generation_request::{GenerationMode, GenerationRequest, OutputFormat};
use kw_gen_core::prompt::{Prompter, prompt_add_keyword};

/// Line-based prompter reading answers from stdin.
/// An empty line (or end of input) cancels the prompt.
struct StdinPrompter;

impl StdinPrompter {
    fn read_line(&self, title: &str, prompt: &str) -> Option<String> {
        print!("[{title}] {prompt}");
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_owned()).filter(|l| !l.is_empty()),
        }
    }
}

impl Prompter for StdinPrompter {
    fn ask_text(&mut self, title: &str, prompt: &str) -> Option<String> {
        self.read_line(title, prompt)
    }

    fn ask_integer(&mut self, title: &str, prompt: &str, default: i64, min: i64) -> Option<i64> {
        loop {
            let Some(line) = self.read_line(title, &format!("{prompt}[{default}] ")) else {
                return Some(default);
            };
            match line.parse::<i64>() {
                Ok(value) if value >= min => return Some(value),
                _ => println!("Please enter an integer >= {min}"),
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Start from the default vocabulary (8 categories)
    let mut session = Session::new();
    session.on_change(|event| println!("  changed: {event:?}"));

    // Add a category and a few weighted keywords.
    // Higher weight means a higher chance to be drawn.
    session.add_category("材质")?;
    session.add_keyword("材质", "碳纤维", 3)?;
    session.add_keyword("材质", "钛合金", 2)?;
    session.add_keyword("材质", "陶瓷", 1)?;

    // Errors are values: a duplicate category is reported, not fatal
    match session.add_category("材质") {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{e}"),
    }
    match session.add_keyword("材质", "玻璃", 0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{e}"),
    }

    let selected = ["风格", "类型", "材质"];

    // Uniform: each draw picks a category, then a keyword in it
    let request = GenerationRequest::new(selected, 5, false, OutputFormat::SingleLine);
    println!("Uniform:   {}", session.generate_text(&request)?);

    // Balanced: 6 / 3 = 2 keywords per category
    let request = GenerationRequest::new(selected, 6, true, OutputFormat::CommaSeparated);
    println!("Balanced:  {}", session.generate_text(&request)?);

    // Per category: fixed count for "风格", random count for "材质"
    session.update_setting("风格", 1, false)?;
    session.update_setting("材质", 0, true)?;
    let request = GenerationRequest::new(selected, 4, false, OutputFormat::MultiLine)
        .with_mode(GenerationMode::PerCategoryPolicy);
    println!("Per category:\n{}", session.generate_text(&request)?);

    // Deleting a keyword removes every entry with that text
    session.add_keyword("材质", "陶瓷", 5)?;
    println!("Removed {} entries", session.delete_keyword("材质", "陶瓷")?);

    // Interactive part: add keywords to "材质" until the prompt is left empty
    let mut prompter = StdinPrompter;
    while let Some((text, weight)) = prompt_add_keyword(&mut session, &mut prompter, "材质")? {
        println!("Added {text} ({weight})");
    }

    // Output format picked by its display label
    let format = prompter
        .ask_text("Format", "单行 / 逗号分隔 / 多行: ")
        .and_then(|label| OutputFormat::from_label(&label))
        .unwrap_or_default();
    let request = GenerationRequest::new(["材质"], 3, false, format);
    println!("{}", session.generate_text(&request)?);

    println!("{}", session.serialize()?);
    Ok(())
}
