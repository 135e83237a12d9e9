// Entrypoint for the CLI application.
// - Keeps `main` small: bootstrap a session, then run the navigation loop.
// - Single-threaded runtime: concurrent page downloads are multiplexed onto
//   one thread, never parallel threads.

use std::path::Path;

use chili_previews::{
    api::RemoteApi,
    config::FileConfig,
    nav::{self, FolderListing, PathStack, Selection},
    pipeline,
    session,
    ui::{self, ConsolePrompt},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = FileConfig::load();
    let prompt = ConsolePrompt;

    let (client, session) = session::bootstrap(&prompt, &config).await?;

    // The navigation loop is the program's main loop; it only ends at
    // process termination.
    let mut path = PathStack::new();
    let output_root = Path::new(pipeline::OUTPUT_ROOT);
    loop {
        let items = client
            .tree_level(&session.api_key, &path.remote_path())
            .await?;
        let listing = FolderListing::from_items(&items);
        let menu = nav::build_menu(&listing, &path.remote_path());
        let selection = ui::select_from_menu(&prompt, &menu)?;

        if selection == Selection::Process {
            pipeline::run(
                &client,
                &session,
                &prompt,
                &path.remote_path(),
                output_root,
            )
            .await?;
        }
        nav::apply_selection(&selection, &mut path);
    }
}
