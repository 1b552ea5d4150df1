//! Typed statement parameters that sqlx can bind.

use chrono::NaiveTime;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// One bound parameter. Placeholders are always cast (`$n::type`), so `Null` can go out as text.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i32),
    SmallInt(i16),
    Text(String),
    Time(NaiveTime),
    IntArray(Vec<i32>),
}

impl<'q> Encode<'q, Postgres> for SqlValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            SqlValue::Null => <Option<String> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            SqlValue::Int(n) => <i32 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            SqlValue::SmallInt(n) => <i16 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            SqlValue::Text(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf)?,
            SqlValue::Time(t) => <NaiveTime as Encode<Postgres>>::encode_by_ref(t, buf)?,
            SqlValue::IntArray(v) => <Vec<i32> as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            SqlValue::Null | SqlValue::Text(_) => <String as Type<Postgres>>::type_info(),
            SqlValue::Int(_) => <i32 as Type<Postgres>>::type_info(),
            SqlValue::SmallInt(_) => <i16 as Type<Postgres>>::type_info(),
            SqlValue::Time(_) => <NaiveTime as Type<Postgres>>::type_info(),
            SqlValue::IntArray(_) => <Vec<i32> as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for SqlValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}

impl From<i32> for SqlValue {
    fn from(n: i32) -> Self {
        SqlValue::Int(n)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}
