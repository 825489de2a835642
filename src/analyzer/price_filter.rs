use crate::model::{ConfigError, Offer, PriceFilter};

impl PriceFilter {
    /// Builds a filter; `max_price == 0` leaves the upper bound open.
    pub fn new(min_price: u64, max_price: u64) -> Result<Self, ConfigError> {
        if max_price > 0 && min_price > max_price {
            return Err(ConfigError::Invalid(format!(
                "min_price {} exceeds max_price {}",
                min_price, max_price
            )));
        }
        Ok(Self { min_price, max_price })
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_price == 0
    }

    /// Both bounds inclusive.
    pub fn accepts(&self, price: u64) -> bool {
        price >= self.min_price && (self.is_unbounded() || price <= self.max_price)
    }

    /// First offer in list order whose price passes the filter. Lists arrive
    /// cheapest first, so this is the cheapest plausible offer.
    pub fn first_acceptable<'a>(&self, offers: &'a [Offer]) -> Option<&'a Offer> {
        offers.iter().find(|offer| self.accepts(offer.price))
    }
}
