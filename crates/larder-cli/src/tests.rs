use super::*;
use crate::process::ExportFormat;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["larder"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn process_defaults_to_every_format() {
    let cli = Cli::try_parse_from(["larder", "process", "suma.csv"]).unwrap();
    let Some(Commands::Process(args)) = cli.command else {
        panic!("expected process command");
    };
    assert_eq!(args.input, PathBuf::from("suma.csv"));
    assert_eq!(args.category, "Groceries");
    assert_eq!(args.output_dir, PathBuf::from("output"));
    assert_eq!(
        args.formats,
        [
            ExportFormat::Shopify,
            ExportFormat::BusinessCentral,
            ExportFormat::Excel
        ]
    );
    assert!(!args.no_enrich);
    assert!(!args.no_copy);
    assert!(args.inventory.is_none());
}

#[test]
fn process_accepts_flags_and_repeated_formats() {
    let cli = Cli::try_parse_from([
        "larder",
        "process",
        "clf.csv",
        "--category",
        "Health & Beauty",
        "-o",
        "exports",
        "--format",
        "business-central",
        "--format",
        "excel",
        "--no-copy",
        "--inventory",
        "products_export.csv",
    ])
    .unwrap();
    let Some(Commands::Process(args)) = cli.command else {
        panic!("expected process command");
    };
    assert_eq!(args.category, "Health & Beauty");
    assert_eq!(args.output_dir, PathBuf::from("exports"));
    assert_eq!(
        args.formats,
        [ExportFormat::BusinessCentral, ExportFormat::Excel]
    );
    assert!(args.no_copy);
    assert_eq!(args.inventory, Some(PathBuf::from("products_export.csv")));
}

#[test]
fn unknown_format_is_rejected() {
    assert!(Cli::try_parse_from(["larder", "process", "a.csv", "--format", "pdf"]).is_err());
}

#[test]
fn inspect_takes_row_limit() {
    let cli = Cli::try_parse_from(["larder", "inspect", "suma.csv", "--rows", "12"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Inspect { rows: 12, ref category, .. }) if category == "Groceries"
    ));
}

#[test]
fn inventory_file_is_optional() {
    let cli = Cli::try_parse_from(["larder", "inventory"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Inventory {
            file: None,
            limit: 10
        })
    ));
}
