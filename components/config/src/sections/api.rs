use std::time::Duration;

section! {
    #[serde(default)]
    pub struct Api {
        /// Base URL of the upstream StoryGrid REST backend, without a trailing slash.
        pub base_url: String = String::from("https://api.storygrid.app") => "STORYGRID_API_BASE",

        /// User-Agent header sent with every backend request.
        pub user_agent: String = String::from(concat!("storygrid-client/", env!("CARGO_PKG_VERSION"))),

        /// Connect timeout for backend requests.
        ///
        /// Can be parsed from plain seconds or an array of `[seconds, nanoseconds]`
        #[serde(with = "super::util::duration")]
        pub connect_timeout: Duration = Duration::from_secs(10),
    }
}
