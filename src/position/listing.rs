use alloy::primitives::{Address, U256};
use log::debug;

use crate::{chain::PositionManagerReader, error::Result, models::PositionInfo};

/// Every position NFT held by `owner`, in enumeration order.
pub async fn list_positions<R: PositionManagerReader + ?Sized>(
    reader: &R,
    owner: Address,
) -> Result<Vec<PositionInfo>> {
    let balance = reader.balance_of(owner).await?;
    debug!("{} owns {} positions", owner, balance);

    let mut positions = Vec::new();
    let mut index = U256::ZERO;
    while index < balance {
        let token_id = reader.token_of_owner_by_index(owner, index).await?;
        positions.push(reader.positions(token_id).await?);
        index += U256::from(1u8);
    }

    Ok(positions)
}
