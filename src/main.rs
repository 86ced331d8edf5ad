fn main() {
    if let Err(err) = sheet_dashboard::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
