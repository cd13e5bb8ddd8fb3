use super::models::{MuseumMember, ProfileMember};

/// Estimates the coin value of one Skyblock profile member.
pub trait NetworthEstimator: Send + Sync {
    fn estimate(&self, member: &ProfileMember, bank: f64, museum: Option<&MuseumMember>) -> f64;
}

/// Counts coins that the API reports directly: purse, shared bank and the
/// appraised museum value. Inventory contents are not priced.
///
/// Totals run far below item-valuing estimators, so the `networth` thresholds
/// in `reqs.json` have to be tuned to liquid coins rather than to the figures
/// shown by community net-worth sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinNetworth;

impl NetworthEstimator for CoinNetworth {
    fn estimate(&self, member: &ProfileMember, bank: f64, museum: Option<&MuseumMember>) -> f64 {
        member.purse() + bank + museum.map_or(0.0, |museum| museum.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypixel::models::Currencies;

    #[test]
    fn sums_purse_bank_and_museum() {
        let member = ProfileMember {
            leveling: None,
            currencies: Some(Currencies {
                coin_purse: 250.0,
            }),
        };
        let museum = MuseumMember { value: 1000.0 };
        assert!((CoinNetworth.estimate(&member, 750.0, Some(&museum)) - 2000.0).abs() < 1e-9);
        assert!((CoinNetworth.estimate(&member, 0.0, None) - 250.0).abs() < 1e-9);
        assert!(CoinNetworth.estimate(&ProfileMember::default(), 0.0, None) == 0.0);
    }
}
