/// Default lookback when no start date is given (6 months of calendar days)
pub const DEFAULT_LOOKBACK_DAYS: i64 = 180;

/// Moving-average windows applied to the close price
pub const DEFAULT_MA_WINDOWS: [usize; 3] = [20, 50, 100];

/// Moving-average window applied to volume
pub const VOLUME_MA_WINDOW: usize = 20;

/// Default port for the web API
pub const DEFAULT_PORT: u16 = 5000;

/// Vietnam exchange timezone, used to resolve "today"
pub const MARKET_TIMEZONE: &str = "Asia/Ho_Chi_Minh";

/// Frequently requested HOSE tickers, served by GET /api/stocks
pub const POPULAR_STOCKS: [(&str, &str, &str); 10] = [
    ("VNM", "Vinamilk", "Consumer"),
    ("VCB", "Vietcombank", "Banking"),
    ("HPG", "Hoa Phat Group", "Industrial"),
    ("VHM", "Vinhomes", "Real Estate"),
    ("VIC", "Vingroup", "Conglomerate"),
    ("MSN", "Masan Group", "Consumer"),
    ("FPT", "FPT Corporation", "Technology"),
    ("GAS", "PetroVietnam Gas", "Energy"),
    ("TCB", "Techcombank", "Banking"),
    ("MWG", "Mobile World", "Retail"),
];
