use std::time::Duration;

section! {
    #[serde(default)]
    pub struct Session {
        /// How often an at-rest authenticated session is revalidated against the
        /// backend to detect server-side expiry or revocation.
        ///
        /// Default value is 15 minutes
        #[serde(with = "super::util::duration")]
        pub revalidate_interval: Duration = Duration::from_secs(15 * 60),

        /// Attempts per automatic revalidation event before the session is
        /// dropped as expired.
        pub revalidate_attempts: u32 = 3,

        /// Fixed delay between revalidation attempts.
        #[serde(with = "super::util::duration")]
        pub retry_backoff: Duration = Duration::from_secs(1),
    }
}
