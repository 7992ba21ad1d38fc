use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, CommandFactory, Parser, Subcommand};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use directories::{BaseDirs, ProjectDirs};
use inquire::{DateSelect, Select, Text};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gst_invoice::export::pdf::PdfPageWriter;
use gst_invoice::export::typst::TypstRasterizer;
use gst_invoice::format::format_amount;
use gst_invoice::totals::line_amount;
use gst_invoice::validation::RequiredField;
use gst_invoice::words::amount_in_words;
use gst_invoice::{
    ExportCoordinator, ExportError, ITEM_ROWS, InvoiceForm, InvoiceView, ItemField, RenderError,
    ShopProfile,
};

// ==========================================
// Constants
// ==========================================
const PRINT_OPT: &str = "🖨  Print Invoice";
const EDIT_OPT: &str = "✏️  Edit Invoice";
const RESET_OPT: &str = "♻️  Reset";
const QUIT_OPT: &str = "🚪 Quit";

const GREEN: Color = Color::Rgb { r: 4, g: 120, b: 87 };

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Debug, Serialize, Deserialize)]
struct AppSettings {
    output_dir: String,
    #[serde(default = "default_typst_bin")]
    typst_bin: String,
    #[serde(default = "default_settle_delay_ms")]
    settle_delay_ms: u64,
    #[serde(default = "default_reveal")]
    reveal_after_export: bool,
}

fn default_typst_bin() -> String {
    "typst".to_string()
}

fn default_settle_delay_ms() -> u64 {
    200
}

fn default_reveal() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            output_dir: "~/Documents/Invoices".to_string(),
            typst_bin: default_typst_bin(),
            settle_delay_ms: default_settle_delay_ms(),
            reveal_after_export: default_reveal(),
        }
    }
}

impl AppSettings {
    fn output_path(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(&self.output_dir))
    }
}

#[derive(Parser)]
#[command(name = "gst-invoice", about = "GST invoices with amounts in words and PDF export")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in a new invoice interactively
    New {
        /// Shop route key (calcutta-motors, new-calcutta-motors)
        #[arg(long)]
        shop: Option<String>,
    },
    /// Export an invoice to PDF without prompting
    Export(InvoiceArgs),
    /// Show the tax summary for the given items
    Totals {
        #[command(flatten)]
        invoice: InvoiceArgs,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Spell an amount in words (Indian numbering)
    Words { amount: f64 },
    /// Configure output directory and renderer
    Config,
}

#[derive(Args)]
struct InvoiceArgs {
    /// Shop route key (calcutta-motors, new-calcutta-motors)
    #[arg(long)]
    shop: Option<String>,
    #[arg(long)]
    invoice_no: Option<String>,
    /// Invoice date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Receiver name
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    gstin: Option<String>,
    #[arg(long)]
    vehicle: Option<String>,
    /// CGST percent
    #[arg(long)]
    cgst: Option<String>,
    /// SGST percent
    #[arg(long)]
    sgst: Option<String>,
    /// Line item, up to 12 times
    #[arg(long = "item", value_name = "DESC|HSN|QTY|RATE")]
    items: Vec<String>,
}

// ==========================================
// Main Function
// ==========================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::New { shop } => {
            let settings = match load_settings() {
                Some(s) => s,
                None => setup_config_wizard()?,
            };
            run_form_wizard(&settings, shop.as_deref()).await?;
        }
        Commands::Export(args) => {
            let settings = load_settings().unwrap_or_default();
            let mut form = build_form(&args)?;
            if !export_form(&settings, &mut form).await {
                std::process::exit(1);
            }
        }
        Commands::Totals { invoice, json } => {
            let form = build_form(&invoice)?;
            print_summary(&form, json)?;
        }
        Commands::Words { amount } => {
            println!("{}", amount_in_words(amount));
        }
        Commands::Config => {
            setup_config_wizard()?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ==========================================
// 1. Non-interactive Form Building
// ==========================================

fn build_form(args: &InvoiceArgs) -> Result<InvoiceForm> {
    if args.items.len() > ITEM_ROWS {
        bail!("An invoice holds at most {} items, got {}", ITEM_ROWS, args.items.len());
    }

    warn_unknown_shop(args.shop.as_deref());
    let mut form = InvoiceForm::open(args.shop.as_deref());
    if let Some(date) = args.date {
        form.set_date(date);
    }
    if let Some(no) = &args.invoice_no {
        form.set_invoice_no(no.as_str());
    }
    if let Some(name) = &args.name {
        form.set_receiver_name(name.as_str());
    }
    if let Some(address) = &args.address {
        form.set_receiver_address(address.as_str());
    }
    if let Some(gstin) = &args.gstin {
        form.set_receiver_gstin(gstin.as_str());
    }
    if let Some(vehicle) = &args.vehicle {
        form.set_vehicle_no(vehicle.as_str());
    }
    if let Some(cgst) = &args.cgst {
        form.set_cgst_rate(cgst.as_str());
    }
    if let Some(sgst) = &args.sgst {
        form.set_sgst_rate(sgst.as_str());
    }

    // Format: description|hsn|qty|rate, trailing parts may be left out
    for (row, spec) in args.items.iter().enumerate() {
        let mut parts = spec.splitn(4, '|');
        for field in [
            ItemField::Description,
            ItemField::HsnSac,
            ItemField::Quantity,
            ItemField::Rate,
        ] {
            let value = parts.next().unwrap_or("").trim();
            form.update_item(row, field, value)?;
        }
    }
    Ok(form)
}

fn unknown_shop_notice(route: Option<&str>) -> Option<String> {
    let key = route?;
    let routes = ShopProfile::routes();
    if routes.contains(&key) {
        return None;
    }
    Some(format!(
        "Unknown shop '{}' (known: {}), using the first one.",
        key,
        routes.join(", ")
    ))
}

fn warn_unknown_shop(route: Option<&str>) {
    if let Some(notice) = unknown_shop_notice(route) {
        warn!(route = route.unwrap_or_default(), "unknown shop route");
        println!("⚠️  {}", notice);
    }
}

// ==========================================
// 2. Interactive Form
// ==========================================

async fn run_form_wizard(settings: &AppSettings, shop: Option<&str>) -> Result<()> {
    warn_unknown_shop(shop);
    let mut form = InvoiceForm::open(shop);
    println!("✅ Shop: {}", form.state().shop.name);

    loop {
        enter_header(&mut form)?;
        enter_receiver(&mut form)?;
        enter_items(&mut form)?;
        enter_tax_rates(&mut form)?;
        print_summary(&form, false)?;

        loop {
            let options = vec![PRINT_OPT, EDIT_OPT, RESET_OPT, QUIT_OPT];
            let action = Select::new("What next?", options).prompt()?;
            match action {
                PRINT_OPT => {
                    if export_form(settings, &mut form).await {
                        return Ok(());
                    }
                }
                EDIT_OPT => break,
                RESET_OPT => {
                    form.reset(Local::now().date_naive());
                    println!("♻️  Invoice reset.");
                    break;
                }
                _ => return Ok(()),
            }
        }
    }
}

fn enter_header(form: &mut InvoiceForm) -> Result<()> {
    println!("\n--- Invoice ---");
    prompt_required(form, RequiredField::InvoiceNo, "Invoice No.:", "Enter invoice number")?;

    let date = DateSelect::new("Date:")
        .with_default(form.state().date)
        .prompt()?;
    form.set_date(date);
    Ok(())
}

fn enter_receiver(form: &mut InvoiceForm) -> Result<()> {
    println!("\n--- Details of Receiver (Billed To) ---");
    prompt_required(form, RequiredField::ReceiverName, "Name:", "Enter receiver name")?;

    let receiver = form.state().receiver.clone();
    let address = prompt_text("Address:", "Enter address", &receiver.address)?;
    form.set_receiver_address(address);
    let gstin = prompt_text("GSTIN/UIN:", "Enter GSTIN/UIN", &receiver.gstin)?;
    form.set_receiver_gstin(gstin);
    let vehicle = prompt_text("Vehicle No.:", "Enter vehicle number", &receiver.vehicle_no)?;
    form.set_vehicle_no(vehicle);
    Ok(())
}

fn enter_items(form: &mut InvoiceForm) -> Result<()> {
    println!("\n--- Items ({} rows) ---", ITEM_ROWS);
    println!("(Leave Description empty on a blank row to finish)");

    for row in 0..ITEM_ROWS {
        let item = form.state().items[row].clone();
        let label = format!("Row {} Description:", row + 1);
        let desc = prompt_text(&label, "Enter item name", &item.description)?;
        if desc.trim().is_empty() && item.is_blank() {
            break;
        }
        form.update_item(row, ItemField::Description, desc)?;

        let hsn = prompt_text("HSN/SAC:", "HSN/SAC", &item.hsn_sac)?;
        form.update_item(row, ItemField::HsnSac, hsn)?;
        let qty = prompt_text("Qty:", "Qty", &item.quantity)?;
        form.update_item(row, ItemField::Quantity, qty)?;
        let rate = prompt_text("Rate:", "Rate", &item.rate)?;
        form.update_item(row, ItemField::Rate, rate)?;

        let amount = line_amount(&form.state().items[row]);
        println!("   = {}", format_amount(amount));
    }
    Ok(())
}

fn enter_tax_rates(form: &mut InvoiceForm) -> Result<()> {
    let cgst = prompt_text("CGST %:", "9", &form.state().cgst_rate)?;
    form.set_cgst_rate(cgst);
    let sgst = prompt_text("SGST %:", "9", &form.state().sgst_rate)?;
    form.set_sgst_rate(sgst);
    Ok(())
}

fn prompt_text(label: &str, placeholder: &str, current: &str) -> Result<String> {
    Ok(Text::new(label)
        .with_placeholder(placeholder)
        .with_initial_value(current)
        .prompt()?)
}

// Leaving the prompt counts as leaving the field.
fn prompt_required(
    form: &mut InvoiceForm,
    field: RequiredField,
    label: &str,
    placeholder: &str,
) -> Result<()> {
    let value = prompt_text(label, placeholder, form.value(field))?;
    match field {
        RequiredField::InvoiceNo => form.set_invoice_no(value),
        RequiredField::ReceiverName => form.set_receiver_name(value),
    }
    form.blur(field);
    if form.is_invalid(field) {
        println!("⚠️  {}", field.message());
    }
    Ok(())
}

fn show_field_errors(form: &InvoiceForm) {
    for field in RequiredField::ALL {
        if form.is_invalid(field) {
            println!("⚠️  {}", field.message());
        }
    }
}

// ==========================================
// 3. Summary Output
// ==========================================

fn print_summary(form: &InvoiceForm, json: bool) -> Result<()> {
    let summary = form.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let state = form.state();
    let mut items = Table::new();
    items.set_header(vec![
        Cell::new("#"),
        Cell::new("Description"),
        Cell::new("HSN/SAC"),
        Cell::new("Qty"),
        Cell::new("Rate"),
        Cell::new("Amount"),
    ]);
    for (idx, (item, amount)) in state.items.iter().zip(form.line_amounts()).enumerate() {
        if item.is_blank() {
            continue;
        }
        items.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(&item.description),
            Cell::new(&item.hsn_sac),
            Cell::new(&item.quantity),
            Cell::new(&item.rate),
            Cell::new(format_amount(amount)).set_alignment(CellAlignment::Right),
        ]);
    }

    let mut totals = Table::new();
    let money = |v: f64| Cell::new(format_amount(v)).set_alignment(CellAlignment::Right);
    totals.add_row(vec![Cell::new("TOTAL AMOUNT BEFORE TAX"), money(summary.subtotal)]);
    totals.add_row(vec![
        Cell::new(format!("Add: CGST {}%", state.cgst_rate.trim())),
        money(summary.cgst_amount),
    ]);
    totals.add_row(vec![
        Cell::new(format!("Add: SGST {}%", state.sgst_rate.trim())),
        money(summary.sgst_amount),
    ]);
    totals.add_row(vec![Cell::new("Tax Amount IGST"), money(summary.igst_amount)]);
    totals.add_row(vec![
        Cell::new("TOTAL AMOUNT AFTER TAX").add_attribute(Attribute::Bold),
        money(summary.grand_total).add_attribute(Attribute::Bold).fg(GREEN),
    ]);

    println!("\n--- {} | Invoice {} ---", state.shop.name, state.invoice_no.trim());
    println!("{items}");
    println!("{totals}");
    println!("In words: {}", summary.amount_in_words);
    show_field_errors(form);
    Ok(())
}

// ==========================================
// 4. PDF Export
// ==========================================

async fn export_form(settings: &AppSettings, form: &mut InvoiceForm) -> bool {
    let rasterizer = match TypstRasterizer::new(&settings.typst_bin) {
        Ok(r) => r,
        Err(e) => {
            println!("❌ Template Error: {}", e);
            return false;
        }
    };
    let settle_delay = Duration::from_millis(settings.settle_delay_ms);
    let exporter =
        ExportCoordinator::new(rasterizer, PdfPageWriter::default(), settings.output_path())
            .with_settle_delay(settle_delay);

    let mut view = InvoiceView::render(form);
    println!("\n🔨 Generating PDF...");
    match exporter.export(form, &mut view).await {
        Ok(path) => {
            println!("✅ PDF Generated: {:?}", path);
            if settings.reveal_after_export {
                open_and_reveal(&path);
            }
            true
        }
        Err(ExportError::MissingFields(fields)) => {
            for field in fields {
                println!("❌ {}", field.message());
            }
            println!("Please fill in the required fields before generating PDF.");
            false
        }
        Err(ExportError::Render(RenderError::Io(e))) if e.kind() == ErrorKind::NotFound => {
            error!(error = %e, bin = %settings.typst_bin, "renderer not found");
            println!("❌ Error: '{}' is not installed. Please install typst.", settings.typst_bin);
            false
        }
        Err(e) => {
            error!(error = %e, "error generating PDF");
            println!("❌ Error generating PDF. Please try again.");
            false
        }
    }
}

// ==========================================
// 5. Config & Utilities
// ==========================================

fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "gst-invoice", "app") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

fn load_settings() -> Option<AppSettings> {
    let path = get_config_path();
    if !path.exists() {
        return None;
    }
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "ignoring unreadable settings");
            None
        }
    }
}

fn setup_config_wizard() -> Result<AppSettings> {
    println!("\n⚙️  --- Configuration Setup ---");
    let current = load_settings().unwrap_or_default();

    println!("📂 Opening folder picker...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Select Invoice Output Directory")
        .pick_folder();

    let output_dir = if let Some(path) = picked_path {
        path.to_string_lossy().to_string()
    } else {
        println!("❌ No folder selected. Falling back to manual input.");
        Text::new("Enter Output Directory:")
            .with_default(&current.output_dir)
            .prompt()?
    };

    let typst_bin = Text::new("typst executable:")
        .with_default(&current.typst_bin)
        .prompt()?;

    let settings = AppSettings {
        output_dir,
        typst_bin,
        ..current
    };

    let path = get_config_path();
    let toml_str = toml::to_string_pretty(&settings)?;
    fs::write(&path, toml_str)
        .with_context(|| format!("Failed to save settings to {}", path.display()))?;
    info!(path = %path.display(), "settings saved");
    println!("✅ Settings saved.");
    Ok(settings)
}

fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

// Helper: Open file and reveal in Finder/Explorer
fn open_and_reveal(path: &Path) {
    #[cfg(target_os = "macos")]
    Command::new("open").arg("-R").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(format!("/select,{}", path.to_string_lossy())).spawn().ok();

    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(path).spawn().ok();
}
