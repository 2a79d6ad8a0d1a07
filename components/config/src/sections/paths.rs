use std::path::PathBuf;

section! {
    #[serde(default)]
    pub struct Paths {
        /// Directory for locally persisted session state.
        pub data_path: PathBuf = PathBuf::from("./data") => "STORYGRID_DATA_DIR",
    }
}
