use super::*;

impl MatchEngine {
    /// Continuous-distance check between the agent and every ghost. Evading ghosts
    /// are eaten in order; the first pursuing or patrolling ghost ends the round.
    pub(super) fn resolve_collisions(&mut self) {
        let agent_pos = self.agent.world_position(&self.maze);
        let threshold = self.options.collision_distance;

        for idx in 0..self.ghosts.len() {
            let ghost = &self.ghosts[idx];
            if ghost.world_position(&self.maze).distance(agent_pos) >= threshold {
                continue;
            }
            let id = ghost.id();
            match ghost.behavior() {
                GhostBehavior::Evasion => {
                    if self.ghosts[idx].mark_caught() {
                        self.award_ghost(id);
                    }
                }
                GhostBehavior::Recovery => {}
                GhostBehavior::Pursue | GhostBehavior::Patrol => {
                    self.lose_life(id);
                    return;
                }
            }
        }
    }

    fn award_ghost(&mut self, ghost: usize) {
        self.ghost_chain = self.ghost_chain.saturating_add(1);
        let points = chain_points(self.options.ghost_score, self.ghost_chain);
        self.add_score(points);
        self.stats.ghosts += 1;
        debug!(ghost, points, chain = self.ghost_chain, "ghost eaten");
        self.events.push(GameEvent::GhostEaten { ghost, points });
    }

    fn lose_life(&mut self, ghost: usize) {
        self.lives = self.lives.saturating_sub(1);
        self.stats.lives_lost += 1;
        info!(ghost, lives = self.lives, score = self.score, "agent caught");
        self.events.push(GameEvent::AgentCaught {
            lives_remaining: self.lives,
        });
        self.reset_round();
        if self.lives == 0 {
            self.finish(MatchOutcome::GameOver);
        } else {
            self.set_phase(Phase::Ready);
        }
    }
}
