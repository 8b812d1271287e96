use crate::error::{AppError, AppResult};
use crate::models::order::OrderRecord;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// CSV 原始行，按表头名匹配列
#[derive(Debug, Deserialize)]
struct RawOrderRow {
    #[serde(rename = "Order number", default)]
    order_number: Option<String>,
    #[serde(rename = "Head", default)]
    head: Option<String>,
    #[serde(rename = "Body", default)]
    body: Option<String>,
    #[serde(rename = "Legs", default)]
    legs: Option<String>,
    #[serde(rename = "Address", default)]
    address: Option<String>,
}

/// 读取本地 CSV 文件并解析为订单列表
///
/// 外层错误表示整个文件不可用；内层每一行单独成功或失败，
/// 保持 CSV 中的原始顺序。
pub fn load_orders_csv(csv_path: &Path) -> AppResult<Vec<AppResult<OrderRecord>>> {
    let file = std::fs::File::open(csv_path).map_err(|e| AppError::SourceUnavailable {
        url: csv_path.display().to_string(),
        reason: format!("无法读取CSV文件: {}", e),
    })?;
    Ok(parse_orders(file))
}

/// 从任意输入流解析订单
pub fn parse_orders<R: Read>(reader: R) -> Vec<AppResult<OrderRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<RawOrderRow>()
        .enumerate()
        .map(|(index, row)| {
            let row_number = index + 1;
            match row {
                Ok(raw) => into_record(row_number, raw),
                Err(e) => Err(AppError::MalformedRecord {
                    row: row_number,
                    field: format!("<无法解析: {}>", e),
                }),
            }
        })
        .collect()
}

fn into_record(row: usize, raw: RawOrderRow) -> AppResult<OrderRecord> {
    Ok(OrderRecord {
        row,
        order_number: raw.order_number.filter(|v| !v.is_empty()),
        head: required(row, "Head", raw.head)?,
        body: required(row, "Body", raw.body)?,
        legs: required(row, "Legs", raw.legs)?,
        address: required(row, "Address", raw.address)?,
    })
}

fn required(row: usize, field: &str, value: Option<String>) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::MalformedRecord {
            row,
            field: field.to_string(),
        }),
    }
}
