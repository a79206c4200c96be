use monoguard::ui::output;

fn main() {
    if let Err(e) = monoguard::cli::run() {
        output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}
