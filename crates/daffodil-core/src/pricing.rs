//! # Composite Pricing Engine
//!
//! Pure functions that price a composite product under a (possibly partial)
//! configuration.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Composite Pricing Pipeline                           │
//! │                                                                         │
//! │  Product ──► Composite? ── no ──► Ok(None)                             │
//! │                 │                                                       │
//! │                yes                                                      │
//! │                 ▼                                                       │
//! │  validate_priceable ── invalid ──► Err(InvalidProduct)                 │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  Configuration ──► resolve_applied_options ──► [AppliedOption?; items] │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  aggregate(Min) / aggregate(Max) ──► PriceRange  (overflow ──► Err)    │
//! │  completeness gate ──► discount_amount / discount_percent              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-Item Contribution
//! ```text
//!   selected option             → option price × qty (both bounds)
//!   unselected, required        → cheapest × qty (min), priciest × qty (max)
//!   unselected, optional        → 0, except the optional-items max which
//!                                 counts the priciest option × qty
//! ```
//!
//! Nothing here is memoized; callers that price on every state change
//! should cache by `(product id, configuration)`.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    CompositeItem, CompositeItemOption, CompositeProduct, Configuration, PriceRange, Prices,
    Product, DEFAULT_QUANTITY,
};
use crate::validation::validate_priceable;

// =============================================================================
// Lookups
// =============================================================================

/// Source of product entities by id.
pub trait ProductLookup {
    fn product_by_id(&self, id: &str) -> Option<&Product>;
}

/// Source of the live per-product configuration chosen by the shopper.
pub trait AppliedOptionsLookup {
    fn applied_options_by_product_id(&self, product_id: &str) -> Option<&Configuration>;
}

impl ProductLookup for HashMap<String, Product> {
    fn product_by_id(&self, id: &str) -> Option<&Product> {
        self.get(id)
    }
}

impl AppliedOptionsLookup for HashMap<String, Configuration> {
    fn applied_options_by_product_id(&self, product_id: &str) -> Option<&Configuration> {
        self.get(product_id)
    }
}

// =============================================================================
// Applied Options
// =============================================================================

/// An item option merged with the quantity the shopper chose.
///
/// `option` is `None` when the configuration has an entry for the item
/// but its value is null or names no option of the item. The quantity is
/// still carried so unselected items are bounded at that quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedOption<'a> {
    pub option: Option<&'a CompositeItemOption>,
    pub quantity: u32,
}

impl<'a> AppliedOption<'a> {
    /// The selected option, if the configuration resolved to one.
    #[inline]
    pub fn selected(&self) -> Option<&'a CompositeItemOption> {
        self.option
    }
}

/// Resolves a configuration against a product's items.
///
/// The result is aligned with `product.items`: entry `i` is the applied
/// option for item `i`, or `None` when the configuration has no entry for
/// that item.
pub fn resolve_applied_options<'a>(
    product: &'a CompositeProduct,
    configuration: &Configuration,
) -> Vec<Option<AppliedOption<'a>>> {
    product
        .items
        .iter()
        .map(|item| {
            configuration.get(&item.id).map(|entry| AppliedOption {
                option: entry.value.as_deref().and_then(|value| item.option(value)),
                quantity: entry.effective_qty(),
            })
        })
        .collect()
}

/// True when every required item resolved to a concrete option.
fn required_items_selected(
    product: &CompositeProduct,
    applied: &[Option<AppliedOption<'_>>],
) -> bool {
    product
        .items
        .iter()
        .zip(applied)
        .filter(|(item, _)| item.required)
        .all(|(_, applied)| applied.and_then(|a| a.selected()).is_some())
}

// =============================================================================
// Aggregation
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

/// Cheapest or priciest value of `price` across the item's options.
///
/// `None` only when `price` overflows for some option.
fn extreme(
    item: &CompositeItem,
    bound: Bound,
    price: impl Fn(&CompositeItemOption) -> Option<Money>,
) -> Option<Money> {
    let prices = item.options.iter().map(price).collect::<Option<Vec<_>>>()?;
    let extreme = match bound {
        Bound::Min => prices.into_iter().min(),
        Bound::Max => prices.into_iter().max(),
    };
    // Only optional items can be empty; validation rejects the rest.
    Some(extreme.unwrap_or_default())
}

/// Original and discounted contribution of one item to a bound, or `None`
/// when it does not fit in a decimal.
fn item_contribution(
    item: &CompositeItem,
    applied: Option<&AppliedOption<'_>>,
    bound: Bound,
    include_optional: bool,
) -> Option<(Money, Money)> {
    let qty = applied.map_or(DEFAULT_QUANTITY, |a| a.quantity);

    if let Some(option) = applied.and_then(|a| a.selected()) {
        return Some((
            option.price.checked_multiply_quantity(qty)?,
            option.discounted_price()?.checked_multiply_quantity(qty)?,
        ));
    }

    if !item.required && !include_optional {
        return Some((Money::zero(), Money::zero()));
    }

    Some((
        extreme(item, bound, |option| Some(option.price))?.checked_multiply_quantity(qty)?,
        extreme(item, bound, CompositeItemOption::discounted_price)?
            .checked_multiply_quantity(qty)?,
    ))
}

/// Sums the base product price and every item's contribution for a bound.
fn aggregate(
    product: &CompositeProduct,
    applied: &[Option<AppliedOption<'_>>],
    bound: Bound,
    include_optional: bool,
) -> CoreResult<Prices> {
    let totals = product.discounted_price().and_then(|base_discounted| {
        product.items.iter().zip(applied).try_fold(
            (product.price, base_discounted),
            |(original, discounted), (item, applied)| {
                let (item_original, item_discounted) =
                    item_contribution(item, applied.as_ref(), bound, include_optional)?;
                Some((
                    original.checked_add(item_original)?,
                    discounted.checked_add(item_discounted)?,
                ))
            },
        )
    });

    match totals {
        Some((original, discounted)) => Ok(Prices::new(original, discounted)),
        None => Err(overflowed(product)),
    }
}

fn overflowed(product: &CompositeProduct) -> CoreError {
    warn!(product_id = %product.id, "Composite price total overflowed");
    CoreError::overflow(&product.id)
}

/// Checks the product can be priced and resolves an optional configuration.
fn prepare<'a>(
    product: &'a CompositeProduct,
    configuration: Option<&Configuration>,
) -> CoreResult<Vec<Option<AppliedOption<'a>>>> {
    if let Err(err) = validate_priceable(product) {
        warn!(product_id = %product.id, error = %err, "Refusing to price invalid composite product");
        return Err(err);
    }

    Ok(match configuration {
        Some(configuration) => resolve_applied_options(product, configuration),
        None => vec![None; product.items.len()],
    })
}

fn price_range(
    product: &Product,
    configuration: Option<&Configuration>,
    include_optional: bool,
) -> CoreResult<Option<PriceRange>> {
    let Some(composite) = product.as_composite() else {
        return Ok(None);
    };

    let applied = prepare(composite, configuration)?;
    let range = PriceRange {
        min_price: aggregate(composite, &applied, Bound::Min, false)?,
        max_price: aggregate(composite, &applied, Bound::Max, include_optional)?,
    };

    debug!(
        product_id = %composite.id,
        include_optional,
        min = %range.min_price.original_price,
        max = %range.max_price.original_price,
        "Computed composite price range"
    );

    Ok(Some(range))
}

// =============================================================================
// Public Operations
// =============================================================================

/// Price range counting required items only.
///
/// Unselected optional items add nothing; unselected required items span
/// their cheapest to priciest option. Returns `Ok(None)` for products that
/// are not composite.
///
/// ## Example
/// ```rust
/// use daffodil_core::money::Money;
/// use daffodil_core::pricing::required_item_price_range_for_configuration;
/// use daffodil_core::types::{CompositeItem, CompositeItemOption, CompositeProduct, Product};
///
/// let product: Product = CompositeProduct::new(
///     "bundle",
///     Money::from_minor_units(1000),
///     None,
///     vec![CompositeItem::new("base", true, vec![
///         CompositeItemOption::new("a", Money::from_minor_units(500)),
///         CompositeItemOption::new("b", Money::from_minor_units(800)),
///     ])],
/// )
/// .unwrap()
/// .into();
///
/// let range = required_item_price_range_for_configuration(&product, None).unwrap().unwrap();
/// assert_eq!(range.min_price.original_price.to_string(), "15.00");
/// assert_eq!(range.max_price.original_price.to_string(), "18.00");
/// ```
pub fn required_item_price_range_for_configuration(
    product: &Product,
    configuration: Option<&Configuration>,
) -> CoreResult<Option<PriceRange>> {
    price_range(product, configuration, false)
}

/// Broadest price range: the max also assumes every unselected optional
/// item is added at its priciest option.
pub fn optional_item_price_range_for_configuration(
    product: &Product,
    configuration: Option<&Configuration>,
) -> CoreResult<Option<PriceRange>> {
    price_range(product, configuration, true)
}

/// Required-item price range for the shopper's live configuration.
pub fn price_range_as_currently_configured(
    product: &Product,
    applied_options: &impl AppliedOptionsLookup,
) -> CoreResult<Option<PriceRange>> {
    let configuration = applied_options.applied_options_by_product_id(product.id());
    required_item_price_range_for_configuration(product, configuration)
}

/// Applied options for the live configuration, but only once every
/// required item has a concrete selection.
fn complete_selection<'a>(
    composite: &'a CompositeProduct,
    applied_options: &impl AppliedOptionsLookup,
) -> CoreResult<Option<Vec<Option<AppliedOption<'a>>>>> {
    let empty = Configuration::new();
    let configuration = applied_options
        .applied_options_by_product_id(&composite.id)
        .unwrap_or(&empty);

    let applied = prepare(composite, Some(configuration))?;
    if !required_items_selected(composite, &applied) {
        debug!(product_id = %composite.id, "Required items not yet selected; discount unavailable");
        return Ok(None);
    }

    Ok(Some(applied))
}

/// Total discount for the live configuration.
///
/// The product-level discount plus each selected option's discount times
/// its quantity. `Ok(None)` while any required item is unselected, or when
/// the product is not composite.
pub fn discount_amount(
    product: &Product,
    applied_options: &impl AppliedOptionsLookup,
) -> CoreResult<Option<Money>> {
    let Some(composite) = product.as_composite() else {
        return Ok(None);
    };
    let Some(applied) = complete_selection(composite, applied_options)? else {
        return Ok(None);
    };

    let base = composite
        .discount
        .as_ref()
        .map_or(Money::zero(), |discount| discount.amount);

    let total = applied
        .iter()
        .flatten()
        .filter_map(|applied| {
            let discount = applied.selected()?.discount.as_ref()?;
            Some((discount.amount, applied.quantity))
        })
        .try_fold(base, |total, (amount, qty)| {
            total.checked_add(amount.checked_multiply_quantity(qty)?)
        })
        .ok_or_else(|| overflowed(composite))?;

    Ok(Some(total))
}

/// Estimated discount percent for the live configuration.
///
/// Derived from the aggregate original and discounted minimum prices, so
/// it is an estimate: option-level percents do not compose linearly and
/// are never averaged. A zero original price yields zero percent.
pub fn discount_percent(
    product: &Product,
    applied_options: &impl AppliedOptionsLookup,
) -> CoreResult<Option<Decimal>> {
    let Some(composite) = product.as_composite() else {
        return Ok(None);
    };
    let Some(applied) = complete_selection(composite, applied_options)? else {
        return Ok(None);
    };

    // Every required item is selected here, so min is the configured price.
    let prices = aggregate(composite, &applied, Bound::Min, false)?;
    let percent = prices
        .original_price
        .checked_sub(prices.discounted_price)
        .and_then(|saved| saved.percent_of(prices.original_price))
        .ok_or_else(|| overflowed(composite))?;

    Ok(Some(percent))
}

// =============================================================================
// Unit Tests
// =============================================================================
