use serde::de::{self, Deserializer, SeqAccess};
use serde::ser::{SerializeSeq, Serializer};
use std::fmt;

/// Durations serialize as plain seconds, or as an `[seconds, nanoseconds]`
/// pair when sub-second precision is present.
pub mod duration {
    use super::*;

    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.subsec_nanos() == 0 {
            serializer.serialize_u64(value.as_secs())
        } else {
            let mut seq = serializer.serialize_seq(Some(2))?;
            seq.serialize_element(&value.as_secs())?;
            seq.serialize_element(&value.subsec_nanos())?;
            seq.end()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = Duration;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("seconds or a [seconds, nanoseconds] pair")
            }

            fn visit_u64<E: de::Error>(self, secs: u64) -> Result<Duration, E> {
                Ok(Duration::from_secs(secs))
            }

            fn visit_i64<E: de::Error>(self, secs: i64) -> Result<Duration, E> {
                if secs < 0 {
                    return Err(E::custom("negative duration"));
                }

                Ok(Duration::from_secs(secs as u64))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Duration, A::Error> {
                let secs: u64 = seq.next_element()?.ok_or_else(|| de::Error::custom("missing seconds"))?;
                let nanos: u32 = seq.next_element()?.ok_or_else(|| de::Error::custom("missing nanoseconds"))?;

                Ok(Duration::new(secs, nanos))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}
