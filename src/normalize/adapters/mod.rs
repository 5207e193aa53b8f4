mod aggregator_lease;
mod aggregator_sale;
mod commercial;
mod residential;

pub use aggregator_lease::AggregatorLeaseAdapter;
pub use aggregator_sale::AggregatorSaleAdapter;
pub use commercial::CommercialAdapter;
pub use residential::ResidentialAdapter;
