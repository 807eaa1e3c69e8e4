//! Pretty-print helpers for CLI output

use crate::codec::{Codec, CodecSet, FieldCodec, TypeLayout, Value};
use crate::error::ValidationErrors;
use crate::idl::{flatten_accounts, FlatAccount, Idl, IdlArrayLen, IdlGenericArg, IdlType};
use crate::program::{DispatchEntry, Identified, Program};
use colored::Colorize;

/// Print a main header (program name, command title)
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().cyan());
    println!("{}", "─".repeat(50).dimmed());
}

/// Print a sub-header (section within output)
pub fn print_subheader(title: &str) {
    println!();
    println!("{}", title.bold().white());
}

/// Print a key-value pair
pub fn print_field(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a numbered list item
pub fn print_numbered_item(num: usize, text: &str) {
    println!("  {}. {}", format!("{:>2}", num).dimmed(), text);
}

/// Display the IDL overview after a successful check
pub fn display_idl_overview(program: &Program) {
    let idl = program.idl();
    print_header(&format!("Program: {}", idl.metadata.name));

    print_field("Version", &idl.metadata.version);
    print_field("Address", idl.address.as_deref().unwrap_or("-"));
    print_field("Spec", &idl.metadata.spec);

    if let Some(desc) = &idl.metadata.description {
        print_field("Description", desc);
    }

    print_subheader("Summary");
    println!(
        "  {} Instructions, {} Accounts, {} Types, {} Events, {} Errors, {} Layouts",
        format!("{}", idl.instructions.len()).green(),
        format!("{}", idl.accounts.len()).yellow(),
        format!("{}", idl.types.len()).blue(),
        format!("{}", idl.events.len()).magenta(),
        format!("{}", idl.errors.len()).red(),
        format!("{}", program.codecs().len()).cyan(),
    );

    display_instructions(idl);
    println!();
    println!("  {}", "✓ IDL is valid".green().bold());
    println!();
}

fn display_instructions(idl: &Idl) {
    print_subheader(&format!("Instructions ({})", idl.instructions.len()));
    if idl.instructions.is_empty() {
        println!("  {}", "(none)".dimmed());
        return;
    }

    for (i, ix) in idl.instructions.iter().enumerate() {
        let args: Vec<String> = ix
            .args
            .iter()
            .map(|arg| format!("{}: {}", arg.name.yellow(), format_type(&arg.ty).blue()))
            .collect();
        print_numbered_item(i + 1, &format!("{}({})", ix.name.green(), args.join(", ")));

        for account in flatten_accounts(&ix.accounts) {
            println!(
                "       {} {}",
                account.qualified_name(),
                format_account_constraints(&account)
            );
        }
    }
}

/// Format account constraints like [signer, writable]
fn format_account_constraints(account: &FlatAccount<'_>) -> String {
    let account = account.account;
    let mut constraints = Vec::new();

    if account.signer {
        constraints.push("signer".green().to_string());
    }
    if account.writable {
        constraints.push("writable".magenta().to_string());
    }
    if account.optional {
        constraints.push("optional".dimmed().to_string());
    }

    if constraints.is_empty() {
        String::new()
    } else {
        format!("[{}]", constraints.join(", "))
    }
}

/// Display every problem found by validation
pub fn display_validation_errors(errors: &ValidationErrors) {
    print_header(&format!("Validation failed ({} problem(s))", errors.len()));

    let sections: [(&str, Vec<String>); 6] = [
        ("Not resolved types", errors.not_resolved_types.clone()),
        (
            "Duplicate type names",
            errors.duplicate_defined_type_names.clone(),
        ),
        ("Invalid type names", errors.invalid_type_names.clone()),
        (
            "Invalid discriminators",
            errors
                .invalid_discriminators
                .iter()
                .map(ToString::to_string)
                .collect(),
        ),
        (
            "Duplicate instruction names",
            errors.duplicate_instruction_names.clone(),
        ),
        ("Missing types", errors.missing_types.clone()),
    ];

    for (label, entries) in sections.iter().filter(|(_, e)| !e.is_empty()) {
        print_subheader(label);
        for entry in entries {
            println!("  {} {}", "✗".red(), entry);
        }
    }
    println!();
}

/// Display resolved discriminators for accounts, events and instructions
pub fn display_discriminators(program: &Program) {
    print_header(&format!("Discriminators for {}", program.idl().metadata.name));

    let sections: [(&str, &[DispatchEntry]); 2] =
        [("Accounts", program.accounts()), ("Events", program.events())];
    for (label, entries) in sections {
        print_subheader(&format!("{} ({})", label, entries.len()));
        for entry in entries {
            println!(
                "  {}  {}",
                format_discriminator(&entry.discriminator).dimmed(),
                entry.name.yellow()
            );
        }
    }

    print_subheader(&format!("Instructions ({})", program.instructions().len()));
    for entry in program.instructions() {
        println!(
            "  {}  {}",
            format_discriminator(&entry.discriminator).dimmed(),
            entry.name.green()
        );
    }
    println!();
}

/// Display derived layouts, or only the one named `filter`
pub fn display_layouts(codecs: &CodecSet, filter: Option<&str>) {
    print_header("Layouts");

    for (key, layout) in codecs.iter() {
        if filter.map_or(false, |name| name != key) {
            continue;
        }

        let size = match codecs.fixed_size(&Codec::Defined(key.to_string())) {
            Some(n) => format!("{} bytes", n),
            None => "variable".to_string(),
        };
        print_subheader(&format!("{} {}", key, format!("({})", size).dimmed()));

        match layout {
            TypeLayout::Struct(fields) => display_fields(fields, "  "),
            TypeLayout::SimpleEnum(names) => {
                for (i, name) in names.iter().enumerate() {
                    println!("  {} {}", format!("{:>3}", i).dimmed(), name.yellow());
                }
            }
            TypeLayout::ComplexEnum(variants) => {
                for (i, variant) in variants.iter().enumerate() {
                    println!("  {} {}", format!("{:>3}", i).dimmed(), variant.name.yellow());
                    if let Some(fields) = &variant.fields {
                        display_fields(fields, "        ");
                    }
                }
            }
            TypeLayout::Alias(codec) => println!("  = {}", codec.to_string().blue()),
        }
    }
    println!();
}

fn display_fields(fields: &[FieldCodec], indent: &str) {
    if fields.is_empty() {
        println!("{}{}", indent, "(no fields)".dimmed());
    }
    for field in fields {
        println!(
            "{}{}: {}",
            indent,
            field.name.white(),
            field.codec.to_string().blue()
        );
    }
}

/// Display a decoded value as pretty JSON
pub fn display_decoded(identified: Option<Identified<'_>>, value: &Value) {
    if let Some(identified) = identified {
        println!(
            "{} {}",
            identified.kind().label().dimmed(),
            identified.name().green().bold()
        );
    }
    let rendered = serde_json::to_string_pretty(&value.to_json())
        .unwrap_or_else(|_| format!("{:?}", value));
    println!("{}", rendered);
}

/// Format IdlType as readable string
pub fn format_type(ty: &IdlType) -> String {
    let slot = |inner: &Option<Box<IdlType>>| {
        inner
            .as_deref()
            .map_or_else(|| "?".to_string(), format_type)
    };

    match ty {
        IdlType::Option(inner) => format!("Option<{}>", slot(inner)),
        IdlType::COption(inner) => format!("COption<{}>", slot(inner)),
        IdlType::Vec(inner) => format!("Vec<{}>", slot(inner)),
        IdlType::Array(inner, IdlArrayLen::Value(n)) => format!("[{}; {}]", slot(inner), n),
        IdlType::Array(inner, IdlArrayLen::Generic(n)) => format!("[{}; {}]", slot(inner), n),
        IdlType::Defined { name, generics } if generics.is_empty() => name.clone(),
        IdlType::Defined { name, generics } => {
            let args: Vec<String> = generics
                .iter()
                .map(|arg| match arg {
                    IdlGenericArg::Type { ty } => format_type(ty),
                    IdlGenericArg::Const { value } => value.clone(),
                })
                .collect();
            format!("{}<{}>", name, args.join(", "))
        }
        IdlType::Generic(name) => name.clone(),
        primitive => primitive.primitive_name().unwrap_or("?").to_string(),
    }
}

/// Format discriminator bytes as hex
pub fn format_discriminator(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        "(none)".to_string()
    } else {
        let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        format!("[{}]", hex.join(" "))
    }
}

/// Display an error message
pub fn display_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

/// Display a not-found error with the available names
pub fn display_not_found(kind: &str, name: &str, available: &[&str]) {
    display_error(&format!("{} '{}' not found", kind, name));

    if !available.is_empty() {
        eprintln!();
        eprintln!("{}", format!("Available {}s:", kind.to_lowercase()).dimmed());
        for item in available.iter().take(10) {
            eprintln!("  - {}", item.green());
        }
        if available.len() > 10 {
            eprintln!(
                "  {} more...",
                format!("(+{})", available.len() - 10).dimmed()
            );
        }
    }
}
