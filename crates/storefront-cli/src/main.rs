use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};
use storefront_core::token::{self, SellerClaims, SigningKey};
use storefront_core::{Product, ProductQuery, QuerySpec, RawQuery};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront admin CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run a catalogue query over a product dump (JSON lines, `.zst` allowed).
    Query {
        #[arg(long)]
        file: String,
        #[command(flatten)]
        filter: QueryArgs,
    },
    /// Print a signed seller token.
    Token {
        #[arg(long)]
        seller: String,
        #[arg(long, env = "SELLER_KEY_ACTIVE")]
        key: String,
        #[arg(long, default_value = "active")]
        kid: String,
        #[arg(long)]
        ttl_secs: Option<i64>,
    },
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    rating: Option<String>,
    #[arg(long)]
    low_price: Option<String>,
    #[arg(long)]
    high_price: Option<String>,
    #[arg(long)]
    search: Option<String>,
    /// `low-to-high`; anything else sorts high to low.
    #[arg(long)]
    sort: Option<String>,
    #[arg(long)]
    page: Option<String>,
    #[arg(long)]
    par_page: Option<String>,
}

impl From<QueryArgs> for RawQuery {
    fn from(a: QueryArgs) -> Self {
        RawQuery {
            category: a.category,
            location: a.location,
            rating: a.rating,
            low_price: a.low_price,
            high_price: a.high_price,
            search_value: a.search,
            sort_price: a.sort,
            page_number: a.page,
            par_page: a.par_page,
        }
    }
}

fn read_products(path: &str) -> Result<Vec<Product>> {
    let f = std::fs::File::open(path).with_context(|| format!("open {path}"))?;
    let mut s = String::new();
    if path.ends_with(".zst") {
        zstd::Decoder::new(f)?.read_to_string(&mut s)?;
    } else {
        std::io::BufReader::new(f).read_to_string(&mut s)?;
    }
    let mut out = Vec::new();
    for (n, line) in s.lines().enumerate() {
        if !line.trim().is_empty() {
            out.push(
                serde_json::from_str(line).with_context(|| format!("{path}:{}", n + 1))?,
            );
        }
    }
    Ok(out)
}

fn expiry(now: i64, ttl_secs: Option<i64>) -> Result<Option<i64>> {
    ttl_secs
        .map(|t| {
            now.checked_add(t)
                .with_context(|| format!("--ttl-secs {t} overflows the expiry time"))
        })
        .transpose()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Query { file, filter } => {
            let spec = QuerySpec::try_from(RawQuery::from(filter))?;
            let products = read_products(&file)?;
            let page = ProductQuery::run(products, &spec);
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Cmd::Token {
            seller,
            key,
            kid,
            ttl_secs,
        } => {
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
            let claims = SellerClaims {
                sub: seller,
                exp: expiry(now, ttl_secs)?,
            };
            let token = token::sign(&SigningKey { kid, secret: key }, &claims)?;
            println!("{token}");
        }
    }
    Ok(())
}
