//! Root orchestrator - scatter, first comparator, gather

use futures::future::try_join_all;
use tracing::debug;

use oems_core::{compare_exchange, Element, OemsError, OemsResult};
use oems_topology::{NetworkPlan, RootPlan};
use oems_transport::Communicator;

use crate::send_pair;

/// Duties of rank 0 for one network plan
pub struct RootOrchestrator<'a, C: Communicator + ?Sized> {
    comm: &'a C,
    plan: &'a NetworkPlan,
}

impl<'a, C: Communicator + ?Sized> RootOrchestrator<'a, C> {
    pub fn new(comm: &'a C, plan: &'a NetworkPlan) -> Self {
        RootOrchestrator { comm, plan }
    }

    fn check_input(&self, elements: &[Element]) -> OemsResult<()> {
        if elements.len() != self.plan.width() {
            return Err(OemsError::InputLength {
                expected: self.plan.width(),
                actual: elements.len(),
            });
        }
        Ok(())
    }

    /// Send positions `(2k, 2k + 1)` to each first-layer rank `k`.
    ///
    /// Positions 0 and 1 stay with the root.
    pub async fn scatter(&self, elements: &[Element]) -> OemsResult<()> {
        self.check_input(elements)?;

        let sends = self.plan.root().scatter.iter().enumerate().map(|(index, rank)| {
            let [first, second] = RootPlan::scatter_positions(index);
            let payload = [elements[first], elements[second]];
            async move { self.comm.send(*rank, &payload).await }
        });
        try_join_all(sends).await?;

        debug!(ranks = self.plan.root().scatter.len(), "scatter complete");
        Ok(())
    }

    /// Compare positions 0 and 1 and forward the results like any comparator
    pub async fn compare_local(&self, elements: &[Element]) -> OemsResult<[Element; 2]> {
        self.check_input(elements)?;

        let results = compare_exchange([elements[0], elements[1]]);
        send_pair(self.comm, self.plan.root().outbound(), results).await?;
        Ok(results)
    }

    /// Collect the sorted vector from the final comparators
    pub async fn gather(&self) -> OemsResult<Vec<Element>> {
        let receives = self.plan.root().gather.iter().map(|gather| async move {
            let payload = self.comm.recv(gather.source, gather.count()).await?;
            Ok::<_, OemsError>((gather, payload))
        });
        let received = try_join_all(receives).await?;

        let mut output = vec![0; self.plan.width()];
        for (gather, payload) in received {
            for (&position, value) in gather.positions.iter().zip(payload) {
                output[position] = value;
            }
        }

        debug!(sources = self.plan.root().gather.len(), "gather complete");
        Ok(output)
    }

    /// Scatter, compare and gather: the root's whole part in a run
    pub async fn run(&self, elements: &[Element]) -> OemsResult<Vec<Element>> {
        self.scatter(elements).await?;
        self.compare_local(elements).await?;
        self.gather().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oems_core::{NetworkConfig, Rank};
    use oems_topology::canonical_plan;
    use oems_transport::{LocalEndpoint, LocalWorld};

    fn world(size: usize) -> Vec<LocalEndpoint> {
        LocalWorld::new(size, &NetworkConfig::default()).into_endpoints()
    }

    #[tokio::test]
    async fn test_scatter_pairs() {
        let endpoints = world(19);
        let plan = canonical_plan();
        let root = RootOrchestrator::new(&endpoints[0], &plan);

        root.scatter(&[5, 2, 8, 1, 9, 3, 7, 4]).await.unwrap();

        assert_eq!(endpoints[1].recv(Rank::ROOT, 2).await.unwrap(), vec![8, 1]);
        assert_eq!(endpoints[2].recv(Rank::ROOT, 2).await.unwrap(), vec![9, 3]);
        assert_eq!(endpoints[3].recv(Rank::ROOT, 2).await.unwrap(), vec![7, 4]);
    }

    #[tokio::test]
    async fn test_local_compare_routes_to_four_and_five() {
        let endpoints = world(19);
        let plan = canonical_plan();
        let root = RootOrchestrator::new(&endpoints[0], &plan);

        let results = root.compare_local(&[5, 2, 8, 1, 9, 3, 7, 4]).await.unwrap();
        assert_eq!(results, [2, 5]);

        assert_eq!(endpoints[4].recv(Rank::ROOT, 1).await.unwrap(), vec![2]);
        assert_eq!(endpoints[5].recv(Rank::ROOT, 1).await.unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn test_gather_places_positions() {
        let endpoints = world(19);
        let plan = canonical_plan();

        endpoints[13].send(Rank::ROOT, &[80]).await.unwrap();
        endpoints[18].send(Rank::ROOT, &[60, 70]).await.unwrap();
        endpoints[17].send(Rank::ROOT, &[40, 50]).await.unwrap();
        endpoints[16].send(Rank::ROOT, &[20, 30]).await.unwrap();
        endpoints[10].send(Rank::ROOT, &[10]).await.unwrap();

        let root = RootOrchestrator::new(&endpoints[0], &plan);
        assert_eq!(root.gather().await.unwrap(), vec![10, 20, 30, 40, 50, 60, 70, 80]);
    }

    #[tokio::test]
    async fn test_rejects_short_input_before_sending() {
        let world = LocalWorld::new(19, &NetworkConfig::default());
        let stats = world.stats();
        let endpoints = world.into_endpoints();
        let plan = canonical_plan();

        let root = RootOrchestrator::new(&endpoints[0], &plan);
        let err = root.scatter(&[1, 2, 3, 4, 5, 6, 7]).await.unwrap_err();

        assert!(matches!(err, OemsError::InputLength { expected: 8, actual: 7 }));
        assert_eq!(stats.total_messages(), 0);
    }
}
