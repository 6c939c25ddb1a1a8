pub mod export;
pub mod formatter;

pub use export::{
    export_report_payload, export_summary_csv, report_file_name, summary_csv_file_name,
    write_summary_csv, ReportData, SUMMARY_CSV_HEADER,
};
pub use formatter::{
    format_age, format_article_detail, format_article_table, format_article_tsv,
    format_breakdown, format_number, format_percent, format_session_header,
    format_summary_table, should_use_colors,
};
