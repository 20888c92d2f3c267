/// Identifier of a priced asset (e.g., "ethereum")
pub type AssetId = String;

/// Identifier of the reference currency quotes are expressed in (e.g., "usd")
pub type ReferenceCurrencyId = String;
