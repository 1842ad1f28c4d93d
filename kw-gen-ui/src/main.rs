use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use eframe::{egui, Frame};
use egui::Context;

use kw_gen_core::config::AppConfig;
use kw_gen_core::document::Snapshot;
use kw_gen_core::model::generation_request::{GenerationMode, GenerationRequest, OutputFormat};
use kw_gen_core::{Result, Session, SessionEvent};

/// Desktop front-end of the keyword generator.
#[derive(Parser, Debug)]
#[command(name = "kw-gen-ui", version, about = "Weighted keyword combination generator")]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra font used as fallback for CJK keywords
    #[arg(long)]
    font: Option<PathBuf>,

    /// Taxonomy document to open at startup
    document: Option<PathBuf>,
}

/// Message shown in the status bar.
enum Status {
    Info(String),
    Error(String),
}

/// Tree interaction, applied once the tree is no longer borrowed.
enum TreeAction {
    SelectCategory(String),
    SelectKeyword(String, String),
}

fn mode_name(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Uniform => "Random categories",
        GenerationMode::Balanced => "Balanced across categories",
        GenerationMode::PerCategoryPolicy => "Per-category counts",
    }
}

fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::CategoryAdded(name) => format!("Category '{name}' added"),
        SessionEvent::CategoryDeleted(name) => format!("Category '{name}' deleted"),
        SessionEvent::KeywordAdded { category, text, weight } => {
            format!("'{text}' (weight {weight}) added to '{category}'")
        }
        SessionEvent::KeywordsDeleted { category, text, count } => {
            format!("{count} entry(ies) '{text}' removed from '{category}'")
        }
        SessionEvent::SettingUpdated { category, .. } => format!("Settings of '{category}' updated"),
        SessionEvent::TaxonomyReplaced => "Taxonomy replaced".to_owned(),
    }
}

/// Builds the startup session: last snapshot first, then the requested
/// document on top of it.
fn build_session(config: &AppConfig, document: Option<&Path>) -> (Session, Option<Status>) {
    let mut status = None;

    let snapshot = config
        .snapshot_path()
        .filter(|p| config.restore_on_start && p.exists())
        .and_then(|path| match Snapshot::load(&path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("Ignoring unreadable snapshot: {e}");
                status = Some(Status::Error(e.to_string()));
                None
            }
        });
    let mut session = snapshot.map(Session::from_snapshot).unwrap_or_default();

    if let Some(path) = document.or(config.default_document.as_deref()) {
        status = Some(match session.load_document(path) {
            Ok(()) => Status::Info(format!("Loaded {}", path.display())),
            Err(e) => {
                log::warn!("Failed to open startup document: {e}");
                Status::Error(e.to_string())
            }
        });
    }

    (session, status)
}

/// Adds a fallback font so that CJK keywords are rendered.
fn install_font(ctx: &Context, path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("user".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push("user".to_owned());
    }
    ctx.set_fonts(fonts);
    Ok(())
}

/// Global UI state (MUST persist between frames in egui).
struct GeneratorUI {
    session: Session,
    config: AppConfig,
    last_change: Rc<RefCell<Option<String>>>,
    status: Option<Status>,

    // Management panel
    current_category: Option<String>,
    current_keyword: Option<String>,
    new_category: String,
    new_keyword: String,
    new_weight: i64,
    fixed_count: i64,
    use_random: bool,
    document_path: Option<PathBuf>,

    // Generator panel
    selected_categories: HashSet<String>,
    total_count: i64,
    mode: GenerationMode,
    output_format: OutputFormat,
    last_output: Option<String>,
}

impl GeneratorUI {
    /// Initializes the UI from the configuration.
    fn new(config: AppConfig, document: Option<PathBuf>) -> Self {
        let (mut session, status) = build_session(&config, document.as_deref());

        let last_change = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&last_change);
        session.on_change(move |event| *sink.borrow_mut() = Some(describe(event)));

        let document_path = document.or_else(|| config.default_document.clone());

        Self {
            last_change,
            status,

            current_category: None,
            current_keyword: None,
            new_category: String::new(),
            new_keyword: String::new(),
            new_weight: 1,
            fixed_count: 3,
            use_random: false,
            document_path,

            selected_categories: HashSet::new(),
            total_count: config.generation.total_count,
            mode: config.generation.mode,
            output_format: config.generation.output_format,
            last_output: None,

            session,
            config,
        }
    }

    /// Shows the outcome of a session call in the status bar.
    ///
    /// A success without a session event clears any previous message.
    fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                let change = self.last_change.borrow_mut().take();
                self.status = change.map(Status::Info);
                Some(value)
            }
            Err(e) => {
                self.status = Some(Status::Error(e.to_string()));
                None
            }
        }
    }

    /// Drops references to categories that no longer exist.
    fn prune(&mut self) {
        let taxonomy = self.session.taxonomy();
        self.selected_categories.retain(|name| taxonomy.contains(name));
        if self.current_category.as_deref().is_some_and(|name| !taxonomy.contains(name)) {
            self.current_category = None;
            self.current_keyword = None;
        }
    }

    fn select_category(&mut self, name: String) {
        let setting = self.session.setting(&name);
        self.fixed_count = i64::from(setting.fixed_count);
        self.use_random = setting.use_random;
        self.current_category = Some(name);
        self.current_keyword = None;
    }

    fn add_category(&mut self) {
        let name = self.new_category.trim().to_owned();
        let result = self.session.add_category(&name);
        if self.report(result).is_some() {
            self.new_category.clear();
            self.select_category(name);
        }
    }

    fn delete_category(&mut self) {
        let Some(name) = self.current_category.clone() else {
            self.status = Some(Status::Error("Select a category first".to_owned()));
            return;
        };
        let result = self.session.delete_category(&name);
        self.report(result);
        self.prune();
    }

    fn add_keyword(&mut self) {
        let Some(category) = self.current_category.clone() else {
            self.status = Some(Status::Error("Select a category first".to_owned()));
            return;
        };
        let text = self.new_keyword.trim().to_owned();
        let result = self.session.add_keyword(&category, &text, self.new_weight);
        if self.report(result).is_some() {
            self.new_keyword.clear();
            self.new_weight = 1;
        }
    }

    fn delete_keyword(&mut self) {
        let (Some(category), Some(text)) = (self.current_category.clone(), self.current_keyword.take()) else {
            self.status = Some(Status::Error("Select a keyword first".to_owned()));
            return;
        };
        let result = self.session.delete_keyword(&category, &text);
        self.report(result);
    }

    fn update_setting(&mut self) {
        let Some(category) = self.current_category.clone() else {
            self.status = Some(Status::Error("Select a category first".to_owned()));
            return;
        };
        let result = self.session.update_setting(&category, self.fixed_count, self.use_random);
        self.report(result);
    }

    /// Native file dialog filtered on JSON documents, starting next to the
    /// last document used.
    fn document_dialog(&self) -> rfd::FileDialog {
        let dialog = rfd::FileDialog::new().add_filter("JSON", &["json"]);
        match &self.document_path {
            Some(path) => {
                let dialog = match path.file_name() {
                    Some(name) => dialog.set_file_name(name.to_string_lossy()),
                    None => dialog,
                };
                match path.parent().filter(|dir| dir.is_dir()) {
                    Some(dir) => dialog.set_directory(dir),
                    None => dialog,
                }
            }
            None => dialog.set_file_name("keywords.json"),
        }
    }

    fn save_document(&mut self) {
        let Some(path) = self.document_dialog().set_title("Save keywords").save_file() else {
            return;
        };
        let result = self.session.save_document(&path);
        if self.report(result).is_some() {
            self.status = Some(Status::Info(format!("Saved to {}", path.display())));
            self.document_path = Some(path);
        }
    }

    fn load_document(&mut self) {
        let Some(path) = self.document_dialog().set_title("Load keywords").pick_file() else {
            return;
        };
        let result = self.session.load_document(&path);
        if self.report(result).is_some() {
            self.status = Some(Status::Info(format!("Loaded {}", path.display())));
            self.document_path = Some(path);
        }
        self.prune();
    }

    /// Builds the request from the generator panel, keeping taxonomy order.
    fn build_request(&self) -> GenerationRequest {
        let selected = self
            .session
            .taxonomy()
            .category_names()
            .into_iter()
            .filter(|name| self.selected_categories.contains(name));
        GenerationRequest::new(selected, self.total_count, false, self.output_format).with_mode(self.mode)
    }

    fn generate(&mut self) {
        let request = self.build_request();
        let result = self.session.generate_text(&request);
        if let Some(text) = self.report(result) {
            self.last_output = Some(text);
        }
    }

    fn show_tree(&mut self, ui: &mut egui::Ui) {
        let mut action = None;
        egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
            for category in self.session.taxonomy().categories() {
                let header = format!("{} ({})", category.name(), category.len());
                let response = egui::CollapsingHeader::new(header)
                    .id_salt(category.name())
                    .show(ui, |ui| {
                        for entry in category.entries() {
                            let selected = self.current_category.as_deref() == Some(category.name())
                                && self.current_keyword.as_deref() == Some(entry.text());
                            let label = format!("{} ({})", entry.text(), entry.weight());
                            if ui.selectable_label(selected, label).clicked() {
                                action = Some(TreeAction::SelectKeyword(
                                    category.name().to_owned(),
                                    entry.text().to_owned(),
                                ));
                            }
                        }
                    });
                if response.header_response.clicked() {
                    action = Some(TreeAction::SelectCategory(category.name().to_owned()));
                }
            }
        });

        match action {
            Some(TreeAction::SelectCategory(name)) => self.select_category(name),
            Some(TreeAction::SelectKeyword(category, text)) => {
                if self.current_category.as_deref() != Some(category.as_str()) {
                    self.select_category(category);
                }
                self.current_keyword = Some(text);
            }
            None => {}
        }
    }

    fn show_management(&mut self, ui: &mut egui::Ui) {
        ui.heading("Categories & keywords");
        self.show_tree(ui);
        ui.separator();

        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.new_category);
            if ui.button("Add category").clicked() {
                self.add_category();
            }
        });
        if ui.button("Delete selected category").clicked() {
            self.delete_category();
        }

        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.new_keyword);
            ui.add(egui::DragValue::new(&mut self.new_weight).range(1..=1000).prefix("weight "));
            if ui.button("Add keyword").clicked() {
                self.add_keyword();
            }
        });
        if ui.button("Delete selected keyword").clicked() {
            self.delete_keyword();
        }

        ui.separator();
        match &self.current_category {
            Some(name) => ui.label(format!("Current category: {name}")),
            None => ui.label("Current category: none"),
        };
        ui.horizontal(|ui| {
            ui.label("Fixed count");
            ui.add(egui::DragValue::new(&mut self.fixed_count).range(0..=1000).speed(1));
        });
        ui.checkbox(&mut self.use_random, "Random count (ignores fixed count)");
        if ui.button("Save settings").clicked() {
            self.update_setting();
        }

        ui.separator();
        match &self.document_path {
            Some(path) => ui.label(format!("Document: {}", path.display())),
            None => ui.label("Document: none"),
        };
        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                self.save_document();
            }
            if ui.button("Load").clicked() {
                self.load_document();
            }
        });
    }

    fn show_generator(&mut self, ui: &mut egui::Ui) {
        ui.heading("Generator");
        ui.label("Categories");
        let names = self.session.taxonomy().category_names();
        for name in names {
            let mut checked = self.selected_categories.contains(&name);
            if ui.checkbox(&mut checked, name.as_str()).changed() {
                if checked {
                    self.selected_categories.insert(name);
                } else {
                    self.selected_categories.remove(&name);
                }
            }
        }
        ui.separator();

        egui::Grid::new("generator_grid")
            .num_columns(2)
            .spacing([20.0, 6.0])
            .striped(true)
            .show(ui, |ui| {
                ui.label("Number of keywords");
                ui.add(egui::DragValue::new(&mut self.total_count).range(0..=1000).speed(1));
                ui.end_row();

                ui.label("Mode");
                ui.vertical(|ui| {
                    for mode in GenerationMode::ALL {
                        ui.radio_value(&mut self.mode, mode, mode_name(mode));
                    }
                });
                ui.end_row();

                ui.label("Output format");
                egui::ComboBox::from_label("")
                    .selected_text(self.output_format.label())
                    .show_ui(ui, |ui| {
                        for format in OutputFormat::ALL {
                            ui.selectable_value(&mut self.output_format, format, format.label());
                        }
                    });
                ui.end_row();
            });

        ui.separator();
        ui.horizontal(|ui| {
            if ui.add_sized([200.0, 40.0], egui::Button::new("Generate")).clicked() {
                self.generate();
            }
            if let Some(output) = &self.last_output {
                if ui.button("Copy").clicked() {
                    ui.ctx().copy_text(output.clone());
                }
            }
        });

        match &self.last_output {
            Some(output) => ui.add(egui::Label::new(output.as_str()).selectable(true)),
            None => ui.label("Select categories and click Generate"),
        };
    }
}

impl eframe::App for GeneratorUI {
    /// UI update loop (called every frame).
    fn update(&mut self, ctx: &Context, _: &mut Frame) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| match &self.status {
            Some(Status::Info(message)) => {
                ui.label(message);
            }
            Some(Status::Error(message)) => {
                ui.colored_label(egui::Color32::RED, message);
            }
            None => {
                ui.label("Ready");
            }
        });

        egui::SidePanel::left("management")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.show_management(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| self.show_generator(ui));
        });
    }

    /// Saves the session snapshot on exit, if enabled.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if !self.config.save_on_exit {
            return;
        }
        if let Some(path) = self.config.snapshot_path() {
            if let Err(e) = self.session.save_snapshot(&path) {
                log::error!("Failed to save session snapshot: {e}");
            }
        }
    }
}

/// Application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Args { config, font, document } = Args::parse();
    let config = match config {
        Some(path) => AppConfig::load(&path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => AppConfig::load_default().context("Failed to load configuration")?,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "kw-gen",
        options,
        Box::new(move |cc| {
            if let Some(font) = &font {
                if let Err(e) = install_font(&cc.egui_ctx, font) {
                    log::warn!("{e:#}");
                }
            }
            Ok(Box::new(GeneratorUI::new(config, document)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
