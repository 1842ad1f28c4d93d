use crate::error::{KeywordError, Result};
use crate::session::Session;

/// Synchronous user prompts provided by the presentation layer.
///
/// Every method returns `None` when the user cancels.
pub trait Prompter {
	/// Asks for a line of text.
	fn ask_text(&mut self, title: &str, prompt: &str) -> Option<String>;

	/// Asks for an integer, pre-filled with `default` and refusing values
	/// below `min`.
	fn ask_integer(&mut self, title: &str, prompt: &str, default: i64, min: i64) -> Option<i64>;
}

/// Asks for a category name and adds it.
///
/// Returns the added name, or `None` if the user cancelled or entered a
/// blank name.
pub fn prompt_add_category(session: &mut Session, prompter: &mut dyn Prompter) -> Result<Option<String>> {
	let Some(name) = prompter.ask_text("添加分类", "请输入新的分类名称：") else {
		return Ok(None);
	};
	let name = name.trim();
	if name.is_empty() {
		return Ok(None);
	}

	session.add_category(name)?;
	Ok(Some(name.to_owned()))
}

/// Asks for a keyword and its weight, then adds it to `category`.
///
/// The category is checked before prompting. Returns the added
/// `(text, weight)`, or `None` if the user cancelled either prompt.
pub fn prompt_add_keyword(
	session: &mut Session,
	prompter: &mut dyn Prompter,
	category: &str,
) -> Result<Option<(String, i64)>> {
	if !session.taxonomy().contains(category) {
		return Err(KeywordError::category_not_found(category));
	}

	let Some(text) = prompter.ask_text("添加关键词", &format!("请输入要添加到 '{category}' 的关键词：")) else {
		return Ok(None);
	};
	let text = text.trim().to_owned();
	if text.is_empty() {
		return Ok(None);
	}

	let Some(weight) = prompter.ask_integer("设置权重", &format!("为 '{text}' 设置权重（默认1）："), 1, 1) else {
		return Ok(None);
	};

	session.add_keyword(category, &text, weight)?;
	Ok(Some((text, weight)))
}
