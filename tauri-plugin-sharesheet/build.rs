const COMMANDS: &[&str] = &["share", "is_share_pending"];

fn main() {
    tauri_plugin::Builder::new(COMMANDS)
        .android_path("android")
        .ios_path("ios")
        .build();
}
